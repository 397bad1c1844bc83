//! # Carga Ingest
//!
//! 需求檔與主檔目錄的檔案匯入

pub mod catalog_loader;
pub mod demand_reader;

// Re-export 主要類型
pub use catalog_loader::{
    load_container_catalog, load_efficiency_catalog, load_flow_catalog, load_part_catalog,
    load_stacking_catalog, load_vehicle_catalog,
};
pub use demand_reader::DemandReader;

/// 匯入錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("檔案讀取失敗: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 解析失敗: {0}")]
    Csv(#[from] csv::Error),

    #[error("檔案 {file} 缺少必要欄位: {column}")]
    MissingColumn { file: String, column: String },

    #[error("找不到需求資料夾: {0}")]
    MissingDemandFolder(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;

impl From<IngestError> for carga_core::CargaError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::MissingColumn { file, column } => {
                carga_core::CargaError::MissingColumn { file, column }
            }
            IngestError::MissingDemandFolder(folder) => {
                carga_core::CargaError::CatalogNotFound(folder)
            }
            other => carga_core::CargaError::InvalidData(other.to_string()),
        }
    }
}
