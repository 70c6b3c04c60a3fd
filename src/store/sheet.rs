use crate::error::{Result, SnippetError};
use crate::model::Catalog;
use url::Url;

/// Turn a Google Sheets URL into its CSV export URL
///
/// Accepts the usual browser URL shapes:
///   https://docs.google.com/spreadsheets/d/<id>/edit#gid=<gid>
///   https://docs.google.com/spreadsheets/d/<id>/edit?gid=<gid>
/// The gid defaults to 0 (the first worksheet) when absent.
pub fn export_url(sheet_url: &str) -> Result<String> {
    let parsed =
        Url::parse(sheet_url).map_err(|e| SnippetError::SheetUrl(format!("{}: {}", sheet_url, e)))?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();

    let id = segments
        .iter()
        .position(|s| *s == "d")
        .and_then(|i| segments.get(i + 1))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            SnippetError::SheetUrl(format!("no spreadsheet id in {}", sheet_url))
        })?;

    let gid = find_gid(&parsed).unwrap_or_else(|| "0".to_string());

    Ok(format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        id, gid
    ))
}

/// The gid may live in the fragment ("#gid=272498272") or the query string
fn find_gid(url: &Url) -> Option<String> {
    if let Some(fragment) = url.fragment() {
        for part in fragment.split('&') {
            if let Some(gid) = part.strip_prefix("gid=") {
                return Some(gid.to_string());
            }
        }
    }
    url.query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.into_owned())
}

/// Download a publicly viewable sheet as a catalog
///
/// No authentication: the sheet must be readable by anyone with the link.
pub fn fetch_catalog(sheet_url: &str) -> Result<Catalog> {
    let csv_url = export_url(sheet_url)?;
    log::debug!("fetching sheet export: {}", csv_url);

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("snippet-tools/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client.get(&csv_url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(SnippetError::SheetUrl(format!(
            "sheet export returned HTTP {} (is the sheet shared publicly?)",
            status.as_u16()
        )));
    }

    let body = response.text()?;
    super::csv::read_catalog(body.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_with_fragment_gid() {
        let url = export_url(
            "https://docs.google.com/spreadsheets/d/1U9ozNFwV_abc/edit#gid=272498272",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://docs.google.com/spreadsheets/d/1U9ozNFwV_abc/export?format=csv&gid=272498272"
        );
    }

    #[test]
    fn test_export_url_with_query_gid() {
        let url =
            export_url("https://docs.google.com/spreadsheets/d/abc123/edit?gid=7").unwrap();
        assert!(url.ends_with("gid=7"));
    }

    #[test]
    fn test_export_url_defaults_gid_zero() {
        let url = export_url("https://docs.google.com/spreadsheets/d/abc123/edit").unwrap();
        assert!(url.ends_with("gid=0"));
    }

    #[test]
    fn test_export_url_rejects_garbage() {
        assert!(export_url("not a url").is_err());
        assert!(export_url("https://docs.google.com/spreadsheets/").is_err());
    }
}
