//! # Carga Core
//!
//! 核心資料模型與類型定義

pub mod container;
pub mod demand;
pub mod efficiency;
pub mod enriched;
pub mod flow;
pub mod part;
pub mod stacking;
pub mod vehicle;

// Re-export 主要類型
pub use container::{ContainerCatalog, ContainerRecord};
pub use demand::{DemandLine, RoutedDemand, SaturationBasis};
pub use efficiency::{LengthEfficiencyCatalog, LengthEfficiencyRecord};
pub use enriched::{EnrichedLine, UnregisteredPart};
pub use flow::{normalize_codes, FlowCatalog, FlowRecord};
pub use part::{PartCatalog, PartRecord};
pub use stacking::{StackingCatalog, StackingRule};
pub use vehicle::{VehicleCatalog, VehicleRecord};

/// 飽和度引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum CargaError {
    #[error("找不到目錄檔案: {0}")]
    CatalogNotFound(String),

    #[error("目錄檔案 {file} 缺少必要欄位: {column}")]
    MissingColumn { file: String, column: String },

    #[error("找不到車輛代碼: {0}")]
    UnknownVehicle(String),

    #[error("無效的資料: {0}")]
    InvalidData(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CargaError>;
