//! 需求濃縮（主檔連接與物理量推導）

use carga_core::{
    ContainerCatalog, EnrichedLine, PartCatalog, RoutedDemand, VehicleCatalog,
};
use rust_decimal::Decimal;

/// 天花板除法：部分裝載的容器仍佔用一整個位置
pub fn ceil_div(quantity: Decimal, units_per_container: Decimal) -> Option<Decimal> {
    if units_per_container <= Decimal::ZERO {
        return None;
    }
    Some((quantity / units_per_container).ceil())
}

/// 需求濃縮計算器
pub struct EnrichmentCalculator;

impl EnrichmentCalculator {
    /// 濃縮單筆配流需求
    ///
    /// 純函數：輸入 + 主檔快照 → 恰好一筆濃縮行。
    /// 複合鍵分兩步建立：先以圖號單獨解析最新版次的容器類型（引導），
    /// 再以（圖號, 容器類型）取得收容數、描述與重量。
    /// 複合鍵無匹配時容器類型留空（「未登錄」標記），推導欄位全數留空，
    /// 該行之後列入未登錄料件表而非中斷計算。
    pub fn enrich_line(
        routed: &RoutedDemand,
        parts: &PartCatalog,
        containers: &ContainerCatalog,
        vehicles: &VehicleCatalog,
    ) -> EnrichedLine {
        let mut line = EnrichedLine::from_routed(routed);

        line.supplier_name = Self::resolve_supplier_name(routed, parts);

        if let Some(code) = line.vehicle_code {
            line.vehicle_max_weight = vehicles.max_weight(code);
        }

        // 第一步：圖號 → 最新版次容器類型
        let container_type = match parts.container_for_drawing(&routed.demand.drawing_id) {
            Some(mdr) => mdr.to_string(),
            None => return line,
        };

        // 第二步：複合鍵 (圖號, 容器類型)
        let part = match parts.record(&routed.demand.drawing_id, &container_type) {
            Some(record) => record,
            None => return line,
        };

        line.container_type = Some(container_type.clone());
        line.material_description = Some(part.description.clone());
        line.units_per_container = part.units_per_container;

        if let Some(record) = containers.record(&container_type) {
            line.container_description = Some(record.description.clone());
        }

        line.package_count = part
            .units_per_container
            .and_then(|qme| ceil_div(routed.demand.quantity, qme));

        line.volume_m3 = match (line.package_count, containers.volume(&container_type)) {
            (Some(count), Some(volume)) => Some((count * volume).round_dp(1)),
            _ => None,
        };

        line.material_weight = part
            .unit_weight
            .map(|weight| (routed.demand.quantity * weight).round_dp(1));

        line.container_weight = match (line.package_count, containers.weight(&container_type)) {
            (Some(count), Some(weight)) => Some((count * weight).round_dp(1)),
            _ => None,
        };

        line.total_weight = match (line.material_weight, line.container_weight) {
            (Some(material), Some(container)) => Some(material + container),
            _ => None,
        };

        line
    }

    /// 供應商顯示名稱解析
    ///
    /// 名稱鍵取路線的 IMS 代碼，未提供時退回供應商代碼；
    /// 斜線分隔時取第一段
    fn resolve_supplier_name(routed: &RoutedDemand, parts: &PartCatalog) -> Option<String> {
        let raw = routed
            .ims_code
            .clone()
            .unwrap_or_else(|| routed.demand.supplier_code.to_string());

        let key = raw.split('/').next().unwrap_or(&raw).trim().parse::<i64>().ok()?;
        parts.supplier_name(key).map(|name| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carga_core::{ContainerRecord, DemandLine, PartRecord, VehicleRecord};
    use chrono::NaiveDate;
    use rstest::rstest;

    fn parts() -> PartCatalog {
        PartCatalog::from_records(vec![PartRecord::new(
            "12345".to_string(),
            77,
            "FORNECEDOR A".to_string(),
        )
        .with_description("SUPORTE DIANTEIRO".to_string())
        .with_container("MDR-A".to_string())
        .with_units_per_container(Decimal::from(100))
        .with_unit_weight(Decimal::new(25, 1))
        .with_updated_on(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())])
    }

    fn containers() -> ContainerCatalog {
        ContainerCatalog::from_records(vec![ContainerRecord::new("MDR-A".to_string())
            .with_description("CAIXA PLASTICA GRANDE".to_string())
            .with_volume(Decimal::new(12, 1))
            .with_weight(Decimal::from(15))])
    }

    fn vehicles() -> VehicleCatalog {
        VehicleCatalog::from_records(vec![
            VehicleRecord::new(4, "CARRETA".to_string()).with_max_weight(Decimal::from(24000)),
        ])
    }

    fn routed(drawing: &str, quantity: i64) -> RoutedDemand {
        RoutedDemand::unrouted(DemandLine::new(
            77,
            "1080".to_string(),
            drawing.to_string(),
            Decimal::from(quantity),
        ))
        .with_vehicle(4)
    }

    #[rstest]
    #[case(250, 100, 3)] // ceil(2.5) = 3
    #[case(200, 100, 2)]
    #[case(1, 100, 1)]
    #[case(101, 100, 2)]
    fn test_ceil_div(#[case] qty: i64, #[case] qme: i64, #[case] expected: i64) {
        let count = ceil_div(Decimal::from(qty), Decimal::from(qme)).unwrap();
        assert_eq!(count, Decimal::from(expected));
        // 不變量：count × qme ≥ qty 且 (count-1) × qme < qty
        assert!(count * Decimal::from(qme) >= Decimal::from(qty));
        assert!((count - Decimal::ONE) * Decimal::from(qme) < Decimal::from(qty));
    }

    #[test]
    fn test_ceil_div_zero_units() {
        assert!(ceil_div(Decimal::from(10), Decimal::ZERO).is_none());
    }

    #[test]
    fn test_enrich_registered_line() {
        let line =
            EnrichmentCalculator::enrich_line(&routed("12345", 250), &parts(), &containers(), &vehicles());

        assert_eq!(line.container_type.as_deref(), Some("MDR-A"));
        assert_eq!(line.supplier_name.as_deref(), Some("FORNECEDOR A"));
        assert_eq!(line.package_count, Some(Decimal::from(3)));
        // 3 × 1.2 m³ = 3.6
        assert_eq!(line.volume_m3, Some(Decimal::new(36, 1)));
        // 250 × 2.5 kg = 625.0
        assert_eq!(line.material_weight, Some(Decimal::new(6250, 1)));
        // 3 × 15 kg = 45.0
        assert_eq!(line.container_weight, Some(Decimal::new(450, 1)));
        assert_eq!(line.total_weight, Some(Decimal::new(6700, 1)));
        assert_eq!(line.vehicle_max_weight, Some(Decimal::from(24000)));
    }

    #[test]
    fn test_enrich_unregistered_drawing() {
        // 圖號不在料件主檔：容器類型留空，推導欄位留空，不 panic
        let line =
            EnrichmentCalculator::enrich_line(&routed("99999", 10), &parts(), &containers(), &vehicles());

        assert!(!line.is_registered());
        assert!(line.package_count.is_none());
        assert!(line.volume_m3.is_none());
        assert!(line.total_weight.is_none());
    }

    #[test]
    fn test_supplier_name_via_ims_code() {
        let routed = RoutedDemand::unrouted(DemandLine::new(
            999999, // 主檔沒有此代碼
            "1080".to_string(),
            "12345".to_string(),
            Decimal::from(10),
        ))
        .with_ims_code("77/123".to_string()); // 斜線取第一段 → 77

        let line =
            EnrichmentCalculator::enrich_line(&routed, &parts(), &containers(), &vehicles());
        assert_eq!(line.supplier_name.as_deref(), Some("FORNECEDOR A"));
    }
}
