use crate::error::{AppError, AppResult, FileError};
use crate::models::dataset::Dataset;
use std::path::Path;
use tokio::fs;

/// 从 CSV 文件读取学生数据集
pub async fn load_dataset(csv_path: &Path) -> AppResult<Dataset> {
    let path_str = csv_path.to_string_lossy().to_string();

    if !csv_path.exists() {
        return Err(AppError::File(FileError::NotFound { path: path_str }));
    }

    let bytes = fs::read(csv_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let dataset = parse_csv(&bytes).map_err(|e| match e {
        AppError::File(FileError::CsvParseFailed { source, .. }) => {
            AppError::File(FileError::CsvParseFailed {
                path: path_str.clone(),
                source,
            })
        }
        other => other,
    })?;

    tracing::info!(
        "✓ 读取 {} 条学生记录，共 {} 列",
        dataset.len(),
        dataset.headers.len()
    );
    Ok(dataset)
}

/// 解析 CSV 字节：首行为表头，空行跳过（只有逗号的行保留），行长度允许不一致
pub fn parse_csv(data: &[u8]) -> AppResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let csv_failed = |e: csv::Error| {
        AppError::File(FileError::CsvParseFailed {
            path: String::new(),
            source: Box::new(e),
        })
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_failed)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .filter(|h| !h.is_empty())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_failed)?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(Dataset::from_rows(headers, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    #[test]
    fn test_parse_csv_basic() {
        let data = b"Name,Roll,Math,Science\nAsha,1,85,92\nRavi,2,30,35\n";
        let dataset = parse_csv(data).unwrap();

        assert_eq!(dataset.headers, vec!["Name", "Roll", "Math", "Science"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[1].get("Science"), Some("35"));
    }

    #[test]
    fn test_parse_csv_skips_empty_lines_and_bom() {
        let data = "\u{feff}Name,Math\nAsha,85\n\n,\nRavi,40\n".as_bytes();
        let dataset = parse_csv(data).unwrap();

        assert_eq!(dataset.headers[0], "Name");
        assert_eq!(dataset.len(), 3);
        // 只有逗号的行成为一条空白记录
        assert_eq!(dataset.records[1].get("Name"), Some(""));
        assert_eq!(dataset.records[2].get("Name"), Some("Ravi"));
    }

    #[test]
    fn test_parse_csv_header_only_is_empty() {
        let err = parse_csv(b"Name,Math\n").unwrap_err();
        assert!(matches!(err, AppError::Data(DataError::EmptyDataset)));
    }

    #[tokio::test]
    async fn test_load_dataset_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("nope.csv")).await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::NotFound { .. })));
    }
}
