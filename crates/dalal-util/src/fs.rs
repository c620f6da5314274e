use std::io;
use std::path::Path;
use tracing::trace;

/// Reads a `.json` file from `path`.
///
/// ```rust,ignore
/// let output: DesiredType = dalal_util::read_json(path).await?;
/// ```
pub async fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> io::Result<T> {
    let file = tokio::fs::read(path.as_ref()).await?;
    let data: T = serde_json::from_slice(&file)?;
    Ok(data)
}

/// Writes `data` to `path` as pretty-printed `.json`.
///
/// Parent directories are created, as necessary, and the file is replaced atomically by
/// writing to a sibling `.tmp` file first.
pub async fn write_json<T: serde::Serialize + ?Sized>(path: impl AsRef<Path>, data: &T) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }

    let bytes = serde_json::to_vec_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    trace!("{} bytes written to {}", bytes.len(), path.display());
    Ok(())
}
