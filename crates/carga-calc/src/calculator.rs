//! 飽和度主計算器

use carga_core::{
    ContainerCatalog, DemandLine, EnrichedLine, FlowCatalog, LengthEfficiencyCatalog,
    PartCatalog, StackingCatalog, UnregisteredPart, VehicleCatalog,
};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::aggregation::AggregationCalculator;
use crate::consolidation::ConsolidationCalculator;
use crate::enrichment::EnrichmentCalculator;
use crate::flow_resolver::FlowResolver;
use crate::integration::IntegrationCalculator;
use crate::stacking::{StackingCalculator, StackingMode};
use crate::summary::SummaryCalculator;
use crate::{SaturationResult, SaturationWarning};

/// 計算選項
#[derive(Debug, Clone)]
pub struct CalcOptions {
    /// 本批次選定的車輛等級（長度效率備援與整批彙總用）
    pub selected_vehicle: u32,

    /// 以選定車輛覆蓋所有需求行的路線車輛
    pub force_selected_vehicle: bool,

    /// 堆疊模式
    pub stacking_mode: StackingMode,
}

impl CalcOptions {
    pub fn new(selected_vehicle: u32) -> Self {
        Self {
            selected_vehicle,
            force_selected_vehicle: false,
            stacking_mode: StackingMode::Standard,
        }
    }

    /// 建構器模式：以選定車輛覆蓋所有行
    pub fn with_forced_vehicle(mut self) -> Self {
        self.force_selected_vehicle = true;
        self
    }

    /// 建構器模式：設置堆疊模式
    pub fn with_stacking_mode(mut self, mode: StackingMode) -> Self {
        self.stacking_mode = mode;
        self
    }
}

/// 飽和度計算器
///
/// 持有一次計算所需的全部主檔快照；快照載入後唯讀，
/// 每次呼叫 `calculate` 都是輸入的純函數，不保留任何批次間狀態。
pub struct SaturationCalculator {
    /// 料件主檔
    parts: PartCatalog,

    /// 容器主檔
    containers: ContainerCatalog,

    /// 車輛主檔
    vehicles: VehicleCatalog,

    /// 堆疊相容規則
    stacking: StackingCatalog,

    /// 長度效率係數
    efficiency: LengthEfficiencyCatalog,

    /// 路線主檔
    flows: FlowCatalog,
}

impl SaturationCalculator {
    /// 創建新的飽和度計算器
    pub fn new(
        parts: PartCatalog,
        containers: ContainerCatalog,
        vehicles: VehicleCatalog,
        stacking: StackingCatalog,
        efficiency: LengthEfficiencyCatalog,
        flows: FlowCatalog,
    ) -> Self {
        Self {
            parts,
            containers,
            vehicles,
            stacking,
            efficiency,
            flows,
        }
    }

    /// 主計算入口
    pub fn calculate(
        &self,
        demands: Vec<DemandLine>,
        options: &CalcOptions,
    ) -> carga_core::Result<SaturationResult> {
        tracing::info!(
            "開始飽和度計算：需求 {} 筆，料件主檔 {} 筆，路線 {} 條",
            demands.len(),
            self.parts.len(),
            self.flows.len()
        );

        let start_time = std::time::Instant::now();
        let mut result = SaturationResult::empty();

        // Step 1: 過濾無效數量
        let before = demands.len();
        let demands: Vec<DemandLine> = demands
            .into_iter()
            .filter(|d| d.has_valid_quantity())
            .collect();
        tracing::debug!("Step 1: 數量過濾 {} → {} 筆", before, demands.len());

        // Step 2: 配流
        tracing::debug!("Step 2: 需求配流");
        let forced = options.force_selected_vehicle.then_some(options.selected_vehicle);
        let routed = FlowResolver::resolve_all(demands, &self.flows, &self.vehicles, forced);

        let unrouted = routed.iter().filter(|r| !r.is_routed()).count();
        if unrouted > 0 {
            result.add_warning(SaturationWarning::info(
                "配流".to_string(),
                format!("{unrouted} 筆需求無匹配路線，僅能進行部分推導"),
            ));
        }

        // Step 3: 濃縮（逐行獨立，並行處理）
        tracing::debug!("Step 3: 需求濃縮");
        let lines: Vec<EnrichedLine> = routed
            .par_iter()
            .map(|r| {
                EnrichmentCalculator::enrich_line(r, &self.parts, &self.containers, &self.vehicles)
            })
            .collect();

        // Step 4: 未登錄料件
        result.unregistered = Self::collect_unregistered(&lines);
        if !result.unregistered.is_empty() {
            tracing::warn!("未登錄圖號 {} 筆", result.unregistered.len());
        }

        // Step 5: 飽和度聚合
        tracing::debug!("Step 5: 飽和度聚合");
        let rows = AggregationCalculator::aggregate(
            &lines,
            &self.containers,
            &self.vehicles,
            &self.stacking,
            &self.efficiency,
            options.selected_vehicle,
        );

        for row in rows.iter().filter(|r| r.capacity.is_none()) {
            result.add_warning(SaturationWarning::warning(
                format!("{}-{}", row.supplier_code, row.container_type),
                "車輛 × 容器容量未登錄，該組合無法評估".to_string(),
            ));
        }

        // Step 6: 堆疊合併
        tracing::debug!("Step 6: 堆疊合併（{:?}）", options.stacking_mode);
        result.stacking =
            StackingCalculator::combine_with_mode(&rows, &self.stacking, options.stacking_mode);
        tracing::debug!("堆疊組合數量: {}", result.stacking.len());

        // Step 7: 整合（聚合值先於逐行回配）
        tracing::debug!("Step 7: 飽和度整合");
        result.saturation = IntegrationCalculator::integrate(&rows, &result.stacking);
        result.lines = IntegrationCalculator::annotate(&lines, &result.saturation);

        // Step 8: 整批彙總
        result.summary =
            SummaryCalculator::summarize(&result.lines, &self.vehicles, options.selected_vehicle);

        // Step 9: 路線彙總
        tracing::debug!("Step 9: 路線彙總");
        result.routes = ConsolidationCalculator::consolidate(&result.lines, &self.flows);

        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "飽和度計算完成，耗時 {:?}；總佔用 {}%，路線 {} 條",
            start_time.elapsed(),
            result.summary.total_occupation_pct,
            result.routes.len()
        );

        Ok(result)
    }

    /// 未登錄料件：容器類型解析失敗的圖號，首見順序去重
    fn collect_unregistered(lines: &[EnrichedLine]) -> Vec<UnregisteredPart> {
        let mut parts: Vec<UnregisteredPart> = Vec::new();
        for line in lines.iter().filter(|l| !l.is_registered()) {
            if parts.iter().any(|p| p.drawing_id == line.drawing_id) {
                continue;
            }
            parts.push(UnregisteredPart {
                supplier_code: line.supplier_code,
                supplier_name: line.supplier_name.clone(),
                destination_code: line.destination_code.clone(),
                drawing_id: line.drawing_id.clone(),
            });
        }
        parts
    }

    /// 主檔存取（測試與報表用）
    pub fn vehicles(&self) -> &VehicleCatalog {
        &self.vehicles
    }

    pub fn flows(&self) -> &FlowCatalog {
        &self.flows
    }
}

/// 守恆檢查輔助：同一容器類型所有行的飽和度合計與聚合值的差
///
/// 僅供測試與資料稽核，不參與計算
pub fn conservation_gap(
    lines: &[EnrichedLine],
    row: &crate::aggregation::SaturationRow,
) -> Option<Decimal> {
    let total = row.total_saturation?;
    let line_sum: Decimal = lines
        .iter()
        .filter(|l| {
            l.supplier_code == row.supplier_code
                && l.container_type.as_deref() == Some(row.container_type.as_str())
        })
        .filter_map(|l| l.saturation_volume_pct)
        .sum();
    Some((line_sum - total * Decimal::from(100)).abs())
}
