//! 路線彙總（依流向重新聚合、車輛數與調度建議）

use carga_core::{EnrichedLine, FlowCatalog, SaturationBasis};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 調度建議
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteSuggestion {
    /// 殘餘 ≤ 2%：取消最後一輛車的取貨
    CutLastPickup,
    /// 殘餘 ≤ 50%：最後一輛改用較小車型
    DownsizeLastVehicle,
    /// 維持原取貨安排
    KeepPickup,
}

impl RouteSuggestion {
    /// 固定的業務門檻：殘餘 ≤ 2% 砍車、≤ 50% 降車型、其餘維持
    pub fn evaluate(vehicle_count: u32, residual: Decimal) -> Self {
        if vehicle_count > 0 && residual <= Decimal::from(2) {
            RouteSuggestion::CutLastPickup
        } else if vehicle_count > 0 && residual <= Decimal::from(50) {
            RouteSuggestion::DownsizeLastVehicle
        } else {
            RouteSuggestion::KeepPickup
        }
    }

    /// 報表顯示文字
    pub fn label(&self) -> &'static str {
        match self {
            RouteSuggestion::CutLastPickup => "Cortar coleta do último veículo",
            RouteSuggestion::DownsizeLastVehicle => "Alterar último veículo para menor porte",
            RouteSuggestion::KeepPickup => "Manter coleta",
        }
    }
}

/// 路線彙總行：一條啟用路線在一個目的地的整體裝載情況
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    /// 流向代碼
    pub flow_id: String,

    /// 目的地代碼
    pub destination_code: String,

    /// 目的地名稱
    pub destination_name: String,

    /// 路線上匹配到的供應商代碼（依路線宣告順序）
    pub supplier_codes: Vec<String>,

    /// 供應商顯示名稱（與代碼同序）
    pub supplier_names: Vec<String>,

    /// 主要車輛名稱
    pub vehicle_name: String,

    /// 技術欄位
    pub technology: String,

    /// 運輸方式（MOT）
    pub transport_mode: String,

    /// 承運商
    pub carrier: String,

    /// 飽和度基準
    pub saturation_basis: SaturationBasis,

    /// 總體積（m³，1 位小數）
    pub total_volume: Decimal,

    /// 總重量（kg，1 位小數）
    pub total_weight: Decimal,

    /// 容器總數
    pub total_packages: Decimal,

    /// 總飽和度（%，2 位小數；依基準選用的欄位加總）
    pub total_saturation_pct: Decimal,

    /// 所需車輛數 = ceil(總飽和度 / 100)，總飽和度 ≤ 0 時為 0
    pub vehicle_count: u32,

    /// 每車有效裝載體積（m³）
    pub usable_capacity_m3: Decimal,

    /// 每車有效裝載比例（%）
    pub usable_capacity_pct: Decimal,

    /// 調度建議
    pub suggestion: RouteSuggestion,

    /// 主檔覆蓋率：有飽和度貢獻的圖號占路線圖號的比例（%，1 位小數）
    pub coverage_pct: Decimal,
}

/// 路線彙總計算器
pub struct ConsolidationCalculator;

impl ConsolidationCalculator {
    /// 將飽和度標註後的濃縮行依目的地 × 路線重新聚合
    ///
    /// 路線啟用條件：路線服務該目的地，且其供應商清單與該目的地需求的
    /// 供應商集合有任一交集（非子集匹配）。
    pub fn consolidate(lines: &[EnrichedLine], flows: &FlowCatalog) -> Vec<RouteSummary> {
        let mut summaries = Vec::new();

        for destination in Self::distinct_destinations(lines) {
            let subset: Vec<&EnrichedLine> = lines
                .iter()
                .filter(|l| l.destination_code == destination)
                .collect();

            for flow in flows.for_destination(&destination) {
                // 交集依路線宣告順序
                let common: Vec<String> = flow
                    .supplier_codes
                    .iter()
                    .filter(|code| {
                        subset
                            .iter()
                            .any(|l| l.supplier_code.to_string() == **code)
                    })
                    .cloned()
                    .collect();

                if common.is_empty() {
                    continue;
                }

                let matched: Vec<&EnrichedLine> = subset
                    .iter()
                    .filter(|l| common.contains(&l.supplier_code.to_string()))
                    .copied()
                    .collect();

                summaries.push(Self::summarize(flow, &destination, &common, &matched));
            }
        }

        summaries
    }

    /// 目的地代碼（首見順序去重）
    fn distinct_destinations(lines: &[EnrichedLine]) -> Vec<String> {
        let mut seen = Vec::new();
        for line in lines {
            if !seen.contains(&line.destination_code) {
                seen.push(line.destination_code.clone());
            }
        }
        seen
    }

    fn summarize(
        flow: &carga_core::FlowRecord,
        destination: &str,
        common: &[String],
        matched: &[&EnrichedLine],
    ) -> RouteSummary {
        let total_volume: Decimal = matched.iter().filter_map(|l| l.volume_m3).sum();
        let total_weight: Decimal = matched.iter().filter_map(|l| l.total_weight).sum();
        let total_packages: Decimal = matched.iter().filter_map(|l| l.package_count).sum();

        let basis = flow.saturation_basis;
        let total_saturation: Decimal = matched
            .iter()
            .filter_map(|l| l.governing_saturation(basis))
            .sum();

        let vehicle_count = if total_saturation > Decimal::ZERO {
            (total_saturation / Decimal::from(100))
                .ceil()
                .to_u32()
                .unwrap_or(0)
        } else {
            0
        };

        let residual = total_saturation % Decimal::from(100);
        let suggestion = RouteSuggestion::evaluate(vehicle_count, residual);

        // 供應商名稱依代碼順序
        let supplier_names: Vec<String> = common
            .iter()
            .map(|code| {
                matched
                    .iter()
                    .find(|l| l.supplier_code.to_string() == *code)
                    .and_then(|l| l.supplier_name.clone())
                    .unwrap_or_default()
            })
            .collect();

        let (usable_capacity_m3, usable_capacity_pct) = if vehicle_count > 0 {
            let count = Decimal::from(vehicle_count);
            (
                (total_volume / count).round_dp(1),
                (total_saturation / count).round_dp(2),
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        RouteSummary {
            flow_id: flow.flow_id.clone(),
            destination_code: destination.to_string(),
            destination_name: flow.destination_name.clone(),
            supplier_codes: common.to_vec(),
            supplier_names,
            vehicle_name: flow.vehicle_name.clone(),
            technology: flow.technology.clone(),
            transport_mode: flow.transport_mode.clone(),
            carrier: flow.carrier.clone(),
            saturation_basis: basis,
            total_volume: total_volume.round_dp(1),
            total_weight: total_weight.round_dp(1),
            total_packages,
            total_saturation_pct: total_saturation.round_dp(2),
            vehicle_count,
            usable_capacity_m3,
            usable_capacity_pct,
            suggestion,
            coverage_pct: Self::coverage(matched, basis),
        }
    }

    /// 主檔覆蓋率：有飽和度貢獻的圖號 / 路線全部圖號
    fn coverage(matched: &[&EnrichedLine], basis: SaturationBasis) -> Decimal {
        let mut all_drawings: Vec<&str> = Vec::new();
        let mut covered: Vec<&str> = Vec::new();

        for line in matched {
            if !all_drawings.contains(&line.drawing_id.as_str()) {
                all_drawings.push(&line.drawing_id);
            }
            let contributes = line
                .governing_saturation(basis)
                .map(|s| s > Decimal::ZERO)
                .unwrap_or(false);
            if contributes && !covered.contains(&line.drawing_id.as_str()) {
                covered.push(&line.drawing_id);
            }
        }

        if all_drawings.is_empty() {
            return Decimal::ZERO;
        }
        (Decimal::from(covered.len() as u64) / Decimal::from(all_drawings.len() as u64)
            * Decimal::from(100))
        .round_dp(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carga_core::{normalize_codes, DemandLine, FlowRecord, RoutedDemand};
    use rstest::rstest;

    #[rstest]
    #[case(2, "0.0", RouteSuggestion::CutLastPickup)]
    #[case(2, "2.0", RouteSuggestion::CutLastPickup)] // 邊界含 2.0
    #[case(2, "2.01", RouteSuggestion::DownsizeLastVehicle)]
    #[case(2, "50.0", RouteSuggestion::DownsizeLastVehicle)] // 邊界含 50.0
    #[case(2, "50.01", RouteSuggestion::KeepPickup)]
    #[case(0, "0.0", RouteSuggestion::KeepPickup)] // 無車輛一律維持
    fn test_suggestion_boundaries(
        #[case] vehicles: u32,
        #[case] residual: &str,
        #[case] expected: RouteSuggestion,
    ) {
        let residual: Decimal = residual.parse().unwrap();
        assert_eq!(RouteSuggestion::evaluate(vehicles, residual), expected);
    }

    fn annotated_line(
        supplier: i64,
        destination: &str,
        drawing: &str,
        volume_sat: Decimal,
    ) -> EnrichedLine {
        let routed = RoutedDemand::unrouted(DemandLine::new(
            supplier,
            destination.to_string(),
            drawing.to_string(),
            Decimal::from(10),
        ));
        let mut line = EnrichedLine::from_routed(&routed);
        line.supplier_name = Some(format!("FORNECEDOR {supplier}"));
        line.container_type = Some("MDR-A".to_string());
        line.package_count = Some(Decimal::from(2));
        line.volume_m3 = Some(Decimal::new(54, 1));
        line.total_weight = Some(Decimal::from(800));
        line.saturation_volume_pct = Some(volume_sat);
        line.saturation_weight_pct = Some(Decimal::new(500, 2));
        line
    }

    fn flows() -> FlowCatalog {
        FlowCatalog::from_records(vec![FlowRecord::new(
            "F-001".to_string(),
            normalize_codes("1080"),
            normalize_codes("77/88/99"),
        )
        .with_destination_name("PLANTA BETIM".to_string())
        .with_vehicle_name("CARRETA".to_string())
        .with_basis(SaturationBasis::Volume)
        .with_carrier("TRANSP X".to_string())])
    }

    #[test]
    fn test_route_activation_by_intersection() {
        // 需求只有供應商 77：與路線 {77,88,99} 有交集 → 啟用
        let lines = vec![
            annotated_line(77, "1080", "D-1", Decimal::from(75)),
            annotated_line(77, "1080", "D-2", Decimal::from(150)),
        ];

        let summaries = ConsolidationCalculator::consolidate(&lines, &flows());
        assert_eq!(summaries.len(), 1);

        let route = &summaries[0];
        assert_eq!(route.flow_id, "F-001");
        // 只有實際出現的供應商列入
        assert_eq!(route.supplier_codes, vec!["77".to_string()]);
        assert_eq!(route.supplier_names, vec!["FORNECEDOR 77".to_string()]);
        // 75 + 150 = 225 → 3 車，殘餘 25 → 降車型
        assert_eq!(route.total_saturation_pct, Decimal::from(225));
        assert_eq!(route.vehicle_count, 3);
        assert_eq!(route.suggestion, RouteSuggestion::DownsizeLastVehicle);
        // 車數不變量
        assert!(Decimal::from(route.vehicle_count * 100) >= route.total_saturation_pct);
    }

    #[test]
    fn test_route_without_common_supplier_skipped() {
        let lines = vec![annotated_line(55, "1080", "D-1", Decimal::from(75))];
        let summaries = ConsolidationCalculator::consolidate(&lines, &flows());
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_weight_basis_selects_weight_column() {
        let flows = FlowCatalog::from_records(vec![FlowRecord::new(
            "F-002".to_string(),
            normalize_codes("1080"),
            normalize_codes("77"),
        )
        .with_basis(SaturationBasis::Weight)]);

        let lines = vec![annotated_line(77, "1080", "D-1", Decimal::from(75))];
        let summaries = ConsolidationCalculator::consolidate(&lines, &flows);

        // 重量欄位 5.00%，而非體積欄位 75%
        assert_eq!(summaries[0].total_saturation_pct, Decimal::new(500, 2));
        assert_eq!(summaries[0].vehicle_count, 1);
    }

    #[test]
    fn test_zero_saturation_zero_vehicles() {
        let lines = vec![annotated_line(77, "1080", "D-1", Decimal::ZERO)];
        let summaries = ConsolidationCalculator::consolidate(&lines, &flows());

        assert_eq!(summaries[0].vehicle_count, 0);
        assert_eq!(summaries[0].usable_capacity_m3, Decimal::ZERO);
        assert_eq!(summaries[0].suggestion, RouteSuggestion::KeepPickup);
    }

    #[test]
    fn test_coverage_metric() {
        // D-1 有貢獻、D-404 無 → 覆蓋率 50%
        let mut dead = annotated_line(77, "1080", "D-404", Decimal::ZERO);
        dead.saturation_volume_pct = None;
        let lines = vec![annotated_line(77, "1080", "D-1", Decimal::from(75)), dead];

        let summaries = ConsolidationCalculator::consolidate(&lines, &flows());
        assert_eq!(summaries[0].coverage_pct, Decimal::new(500, 1));
    }
}
