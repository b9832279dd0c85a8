use std::path::Path;

use crate::{domain::ConnectionRecord, error::ScrapeError};

/// Replaces the artifact at `path` with the records as a pretty JSON array.
/// The previous artifact stays in place if anything fails before the final
/// rename.
///
/// Every write stages into its own uniquely named file next to the artifact,
/// so overlapping runs never share a staging file. The staging file is
/// removed when the write fails.
pub async fn write_records(path: &Path, records: &[ConnectionRecord]) -> Result<(), ScrapeError> {
    let json = serde_json::to_string_pretty(records)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".conexoes-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    tokio::fs::write(staging.path(), json).await?;
    staging.persist(path).map_err(|e| e.error)?;

    log::info!("Saved {} record(s) to {}", records.len(), path.display());
    Ok(())
}

pub async fn read_records(path: &Path) -> Result<Vec<ConnectionRecord>, ScrapeError> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    fn entries(dir: &Path) -> Vec<OsString> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        names.sort();
        names
    }

    fn sample() -> Vec<ConnectionRecord> {
        let mut first = ConnectionRecord::new(0);
        first.connection_name = Some("Acme WA".to_string());
        first.phone_number = Some("+1 555 0100".to_string());
        first.quality = Some("High".to_string());

        let mut second = ConnectionRecord::new(1);
        second.binding_notes = vec!["`Tier` bound to messageLimit by position".to_string()];
        second.eligible = Some(false);

        vec![first, second]
    }

    #[tokio::test]
    async fn written_artifact_reads_back_equal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conexoes.json");
        let records = sample();

        write_records(&path, &records).await.unwrap();

        assert_eq!(read_records(&path).await.unwrap(), records);
        assert_eq!(entries(dir.path()), vec![OsString::from("conexoes.json")]);
    }

    #[tokio::test]
    async fn overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conexoes.json");

        write_records(&path, &sample()).await.unwrap();
        write_records(&path, &[]).await.unwrap();

        assert!(read_records(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn artifact_is_a_plain_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conexoes.json");

        write_records(&path, &sample()).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(raw.as_array().map(|a| a.len()), Some(2));
        assert_eq!(raw[0]["connectionName"], "Acme WA");
        assert!(raw[0]["createdAt"].is_null());
    }

    #[tokio::test]
    async fn overlapping_writes_stage_separately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conexoes.json");
        let first = sample();
        let second = vec![ConnectionRecord::new(0)];

        let (a, b) = tokio::join!(
            write_records(&path, &first),
            write_records(&path, &second)
        );
        a.unwrap();
        b.unwrap();

        let saved = read_records(&path).await.unwrap();
        assert!(saved == first || saved == second);
        assert_eq!(entries(dir.path()), vec![OsString::from("conexoes.json")]);
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conexoes.json");
        std::fs::create_dir(&path).unwrap();

        let err = write_records(&path, &sample()).await.unwrap_err();

        assert!(matches!(err, ScrapeError::Artifact(_)));
        assert!(path.is_dir());
        assert_eq!(entries(dir.path()), vec![OsString::from("conexoes.json")]);
    }
}
