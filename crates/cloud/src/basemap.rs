//! Base-map loading from a local path or an HTTP(S) URL.

use std::future::Future;

use depomap_core::io::{parse_basemap, read_basemap, BaseMap};
use depomap_core::Error;
use tracing::info;

use crate::error::{CloudError, Result};
use crate::http::{HttpClient, HttpOptions};

/// Whether `source` names a remote document.
pub fn is_remote(source: &str) -> bool {
    let s = source.trim_start();
    s.starts_with("http://") || s.starts_with("https://")
}

fn unavailable(source: &str, reason: impl ToString) -> CloudError {
    CloudError::Core(Error::GeometrySourceUnavailable {
        source_name: source.to_string(),
        reason: reason.to_string(),
    })
}

/// Load and parse a base map. Every failure is reported as
/// `GeometrySourceUnavailable`.
pub async fn load(source: &str) -> Result<BaseMap> {
    let map = if is_remote(source) {
        let http = HttpClient::new(HttpOptions::default())?;
        let request = http.client().get(source.trim());
        let text = http.read_text(request).await.map_err(|e| unavailable(source, e))?;
        let map = parse_basemap(&text).map_err(|e| unavailable(source, e))?;
        info!("Fetched base map {}: {} regions", source, map.regions.len());
        map
    } else {
        let path = source.to_string();
        tokio::task::spawn_blocking(move || read_basemap(path))
            .await
            .map_err(|e| unavailable(source, e))??
    };
    Ok(map)
}

/// Like [`load`], but gives up with `Ok(None)` as soon as `cancel` completes.
pub async fn load_cancellable<C>(source: &str, cancel: C) -> Result<Option<BaseMap>>
where
    C: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = cancel => {
            info!("Base map load from {} cancelled", source);
            Ok(None)
        }
        map = load(source) => map.map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MAP: &str = r#"<svg viewBox="0 0 100 60"><g id="turkiye">
        <g id="van" data-iladi="Van"><path d="M 10 10 L 20 10 L 20 20 Z"/></g>
    </g></svg>"#;

    fn map_file() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(MAP.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/map.svg"));
        assert!(is_remote(" http://example.com/map.svg"));
        assert!(!is_remote("data/map.svg"));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let f = map_file();
        let map = load(&f.path().to_string_lossy()).await.unwrap();
        assert_eq!(map.regions.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let err = load("/nonexistent/depomap/map.svg").await.unwrap_err();
        assert!(matches!(err, CloudError::Core(Error::GeometrySourceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_cancel_wins() {
        let f = map_file();
        let out = load_cancellable(&f.path().to_string_lossy(), async {}).await.unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_uncancelled_load_completes() {
        let f = map_file();
        let out = load_cancellable(&f.path().to_string_lossy(), futures::future::pending())
            .await
            .unwrap();
        assert!(out.is_some());
    }
}
