//! # Carga
//!
//! 卡車裝載飽和度計算引擎：需求記錄 × 包裝/車輛主檔 → 逐行濃縮、
//! 容器飽和度與堆疊、路線車輛數與調度建議
//!
//! 計算核心見 [`carga_calc::SaturationCalculator`]，
//! 檔案匯入見 [`carga_ingest`]。

pub use carga_calc::{
    CalcOptions, FlowResolver, RouteSuggestion, RouteSummary, RunSummary, SaturationCalculator,
    SaturationResult, SaturationRow, SaturationWarning, StackingMode, StackingRow,
    WarningSeverity,
};
pub use carga_core::{
    CargaError, ContainerCatalog, ContainerRecord, DemandLine, EnrichedLine, FlowCatalog,
    FlowRecord, LengthEfficiencyCatalog, LengthEfficiencyRecord, PartCatalog, PartRecord,
    RoutedDemand, SaturationBasis, StackingCatalog, StackingRule, UnregisteredPart,
    VehicleCatalog, VehicleRecord,
};
pub use carga_ingest::{DemandReader, IngestError};

/// 頂層執行入口
///
/// 結構性錯誤在此統一記錄並整批中止；中止的批次不產生任何部分輸出，
/// 行級資料問題則已在管線內部以跳過/預設/標記方式回收
pub fn run_saturation(
    calculator: &SaturationCalculator,
    demands: Vec<DemandLine>,
    options: &CalcOptions,
) -> Result<SaturationResult, CargaError> {
    calculator.calculate(demands, options).map_err(|error| {
        tracing::error!("飽和度計算中止: {error}");
        error
    })
}
