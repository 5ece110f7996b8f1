//! Node id normalization shared by the CLI and MCP surfaces.

/// Split comma-joined ids and convert the `12-34` form used in share URLs
/// into the API's `12:34` form. Blank entries are dropped.
pub fn normalize<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .flat_map(|item| {
            item.as_ref()
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| id.replace('-', ":"))
                .collect::<Vec<_>>()
        })
        .collect()
}
