//! 需求檔讀取
//!
//! 兩種來源格式：
//! - 定寬文字檔（舊系統匯出，逐行固定字元位置切片）
//! - 表格 CSV（欄位 DESENHO / COD ORIGEM / ENTREGA SOLICITADA / COD DESTINO）

use std::fs::File;
use std::io::Read;
use std::path::Path;

use carga_core::DemandLine;
use encoding_rs::WINDOWS_1252;
use rust_decimal::Decimal;

use crate::{IngestError, Result};

/// 定寬格式的最小行長
const MIN_LINE_LEN: usize = 20;

/// 需求檔讀取器
pub struct DemandReader;

impl DemandReader {
    /// 解析定寬文字內容
    ///
    /// 字元位置：圖號 [3..14]、供應商 [len-20..len-11]、數量 [len-11..]
    /// （正號字元剔除）。含 AUTOMATIC 的行與格式不符的行靜默丟棄，
    /// 單一壞行不中斷整批匯入。
    pub fn parse_fixed_width(content: &str, destination_code: &str) -> Vec<DemandLine> {
        let mut lines = Vec::new();

        for raw in content.lines() {
            if raw.contains("AUTOMATIC") {
                continue;
            }

            let trimmed: Vec<char> = raw.trim().chars().collect();
            if trimmed.len() < MIN_LINE_LEN {
                continue;
            }

            let len = trimmed.len();
            let drawing: String = trimmed[3..14].iter().collect();
            let supplier: String = trimmed[len - 20..len - 11].iter().collect();
            let quantity: String = trimmed[len - 11..].iter().collect();

            let parsed = Self::parse_sliced_fields(&drawing, &supplier, &quantity);
            if let Some((drawing_id, supplier_code, quantity)) = parsed {
                lines.push(DemandLine::new(
                    supplier_code,
                    destination_code.to_string(),
                    drawing_id,
                    quantity,
                ));
            }
        }

        lines
    }

    fn parse_sliced_fields(
        drawing: &str,
        supplier: &str,
        quantity: &str,
    ) -> Option<(String, i64, Decimal)> {
        let drawing_id = drawing.trim().parse::<i64>().ok()?;
        let supplier_code = supplier.trim().parse::<i64>().ok()?;
        let quantity = quantity.replace('+', "").trim().parse::<i64>().ok()?;
        Some((
            drawing_id.to_string(),
            supplier_code,
            Decimal::from(quantity),
        ))
    }

    /// 讀取定寬文字檔
    ///
    /// 舊系統匯出不保證 UTF-8，以 Windows-1252 寬鬆解碼
    pub fn read_fixed_width<P: AsRef<Path>>(
        path: P,
        destination_code: &str,
    ) -> Result<Vec<DemandLine>> {
        let mut bytes = Vec::new();
        File::open(&path)?.read_to_end(&mut bytes)?;

        let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
        if had_errors {
            tracing::warn!(
                "需求檔 {} 存在無法解碼的字元，已寬鬆處理",
                path.as_ref().display()
            );
        }

        Ok(Self::parse_fixed_width(&decoded, destination_code))
    }

    /// 解析表格 CSV 內容
    pub fn parse_table<R: Read>(reader: R, file_label: &str) -> Result<Vec<DemandLine>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let drawing_idx = column_index(&headers, "DESENHO", file_label)?;
        let supplier_idx = column_index(&headers, "COD ORIGEM", file_label)?;
        let quantity_idx = column_index(&headers, "ENTREGA SOLICITADA", file_label)?;
        let destination_idx = column_index(&headers, "COD DESTINO", file_label)?;

        let mut lines = Vec::new();
        for record in csv_reader.records() {
            let record = record?;

            // 數值欄位解析失敗的行丟棄（與定寬格式同樣寬容）
            let drawing = record
                .get(drawing_idx)
                .and_then(|v| v.trim().parse::<i64>().ok());
            let supplier = record
                .get(supplier_idx)
                .and_then(|v| v.trim().parse::<i64>().ok());
            let quantity = record
                .get(quantity_idx)
                .and_then(|v| v.trim().parse::<i64>().ok());
            let destination = record.get(destination_idx).map(|v| v.trim().to_string());

            if let (Some(drawing), Some(supplier), Some(quantity), Some(destination)) =
                (drawing, supplier, quantity, destination)
            {
                lines.push(DemandLine::new(
                    supplier,
                    destination,
                    drawing.to_string(),
                    Decimal::from(quantity),
                ));
            }
        }

        Ok(lines)
    }

    /// 讀取表格 CSV 檔
    pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Vec<DemandLine>> {
        let label = path.as_ref().display().to_string();
        let file = File::open(&path)?;
        Self::parse_table(file, &label)
    }

    /// 讀取需求資料夾：.txt 走定寬解析、.csv 走表格解析，結果串接
    ///
    /// 過濾非正數量（需求不變量 quantity > 0）
    pub fn read_directory<P: AsRef<Path>>(
        dir: P,
        destination_code: &str,
    ) -> Result<Vec<DemandLine>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(IngestError::MissingDemandFolder(dir.display().to_string()));
        }

        let mut all_lines = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase());

            let parsed = match extension.as_deref() {
                Some("txt") => Self::read_fixed_width(&path, destination_code)?,
                Some("csv") => Self::read_table(&path)?,
                _ => continue,
            };

            tracing::debug!("需求檔 {}: {} 筆", path.display(), parsed.len());
            all_lines.extend(parsed);
        }

        all_lines.retain(|line| line.has_valid_quantity());
        Ok(all_lines)
    }

    /// 多目的地批次：逐目的地讀取後串接
    pub fn read_destinations<P: AsRef<Path>>(
        dir: P,
        destination_codes: &[String],
    ) -> Result<Vec<DemandLine>> {
        let mut all_lines = Vec::new();
        for code in destination_codes {
            all_lines.extend(Self::read_directory(dir.as_ref(), code)?);
        }
        Ok(all_lines)
    }
}

pub(crate) fn column_index(
    headers: &csv::StringRecord,
    column: &str,
    file_label: &str,
) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| IngestError::MissingColumn {
            file: file_label.to_string(),
            column: column.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    //                    0123456789...
    //  圖號 [3..14]，供應商 [len-20..len-11]，數量 [len-11..]
    fn sample_line(drawing: &str, supplier: &str, quantity: &str) -> String {
        format!("XXX{drawing:0>11}ABCDEF{supplier:0>9}{quantity:+>11}")
    }

    #[test]
    fn test_parse_fixed_width_offsets() {
        let content = sample_line("12345", "770001234", "250");
        let lines = DemandReader::parse_fixed_width(&content, "1080");

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].drawing_id, "12345");
        assert_eq!(lines[0].supplier_code, 770001234);
        assert_eq!(lines[0].quantity, Decimal::from(250));
        assert_eq!(lines[0].destination_code, "1080");
    }

    #[test]
    fn test_automatic_lines_skipped() {
        let content = format!(
            "{}\nAUTOMATIC {}\n",
            sample_line("111", "770000001", "10"),
            sample_line("222", "770000002", "20"),
        );
        let lines = DemandReader::parse_fixed_width(&content, "1080");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].drawing_id, "111");
    }

    #[test]
    fn test_short_and_malformed_lines_dropped() {
        let content = format!(
            "curta\n{}\nXXXabcdefghijkABCDEFnao-numerico+000000010\n",
            sample_line("333", "770000003", "30"),
        );
        let lines = DemandReader::parse_fixed_width(&content, "1080");
        // 壞行靜默丟棄，好行保留
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].drawing_id, "333");
    }

    #[test]
    fn test_parse_table() {
        let csv = "DESENHO,COD ORIGEM,ENTREGA SOLICITADA,COD DESTINO\n\
                   12345,770001,250,1080\n\
                   ,770002,100,1080\n\
                   22222,770003,abc,1080\n";
        let lines = DemandReader::parse_table(csv.as_bytes(), "demanda.csv").unwrap();

        // 空圖號與非數值數量的行丟棄
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].drawing_id, "12345");
        assert_eq!(lines[0].quantity, Decimal::from(250));
    }

    #[test]
    fn test_parse_table_missing_column() {
        let csv = "DESENHO,COD ORIGEM\n12345,770001\n";
        let error = DemandReader::parse_table(csv.as_bytes(), "demanda.csv").unwrap_err();

        match error {
            IngestError::MissingColumn { column, .. } => {
                assert_eq!(column, "ENTREGA SOLICITADA");
            }
            other => panic!("預期 MissingColumn，得到 {other:?}"),
        }
    }
}
