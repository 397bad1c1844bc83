//! 需求配流（路線解析）

use carga_core::{DemandLine, FlowCatalog, RoutedDemand, SaturationBasis, VehicleCatalog};

/// 需求配流器
///
/// 以（供應商, 目的地）配對查找第一條匹配的路線，取得該路線的車輛、
/// 飽和度基準與 IMS 代碼。無匹配路線時三者皆留空，該行仍進入濃縮階段。
pub struct FlowResolver;

impl FlowResolver {
    /// 解析單筆需求
    pub fn resolve(
        demand: DemandLine,
        flows: &FlowCatalog,
        vehicles: &VehicleCatalog,
    ) -> RoutedDemand {
        let matched = flows.match_demand(demand.supplier_code, &demand.destination_code);

        match matched {
            Some(flow) => {
                let mut routed = RoutedDemand::unrouted(demand).with_basis(flow.saturation_basis);

                if let Some(code) = vehicles.code_by_name(&flow.vehicle_name) {
                    routed = routed.with_vehicle(code);
                } else {
                    tracing::warn!("路線 {} 的車輛名稱無法解析: {}", flow.flow_id, flow.vehicle_name);
                }

                if let Some(ims) = &flow.ims_code {
                    routed = routed.with_ims_code(ims.clone());
                }

                routed
            }
            None => RoutedDemand::unrouted(demand),
        }
    }

    /// 批次解析；`forced_vehicle` 指定時覆蓋所有行的車輛代碼
    pub fn resolve_all(
        demands: Vec<DemandLine>,
        flows: &FlowCatalog,
        vehicles: &VehicleCatalog,
        forced_vehicle: Option<u32>,
    ) -> Vec<RoutedDemand> {
        demands
            .into_iter()
            .map(|demand| {
                let mut routed = Self::resolve(demand, flows, vehicles);
                if let Some(code) = forced_vehicle {
                    routed.vehicle_code = Some(code);
                }
                routed
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carga_core::{normalize_codes, FlowRecord, VehicleRecord};
    use rust_decimal::Decimal;

    fn vehicles() -> VehicleCatalog {
        VehicleCatalog::from_records(vec![
            VehicleRecord::new(4, "CARRETA".to_string()),
            VehicleRecord::new(3, "TRUCK 3M".to_string()),
        ])
    }

    fn flows() -> FlowCatalog {
        FlowCatalog::from_records(vec![FlowRecord::new(
            "F-001".to_string(),
            normalize_codes("1080/1046"),
            normalize_codes("770001/770002"),
        )
        .with_vehicle_name("Carreta".to_string())
        .with_basis(SaturationBasis::Volume)
        .with_ims_code("123/456".to_string())])
    }

    #[test]
    fn test_resolve_matching_flow() {
        let demand = DemandLine::new(770001, "1080".to_string(), "D-1".to_string(), Decimal::ONE);
        let routed = FlowResolver::resolve(demand, &flows(), &vehicles());

        assert_eq!(routed.vehicle_code, Some(4));
        assert_eq!(routed.saturation_basis, Some(SaturationBasis::Volume));
        assert_eq!(routed.ims_code, Some("123/456".to_string()));
    }

    #[test]
    fn test_resolve_no_flow() {
        // 供應商不在任何路線中：三個欄位皆留空
        let demand = DemandLine::new(999999, "1080".to_string(), "D-1".to_string(), Decimal::ONE);
        let routed = FlowResolver::resolve(demand, &flows(), &vehicles());

        assert!(!routed.is_routed());
        assert!(routed.saturation_basis.is_none());
        assert!(routed.ims_code.is_none());
    }

    #[test]
    fn test_forced_vehicle_overrides_all() {
        let demands = vec![
            DemandLine::new(770001, "1080".to_string(), "D-1".to_string(), Decimal::ONE),
            DemandLine::new(999999, "1080".to_string(), "D-2".to_string(), Decimal::ONE),
        ];
        let routed = FlowResolver::resolve_all(demands, &flows(), &vehicles(), Some(3));

        assert!(routed.iter().all(|r| r.vehicle_code == Some(3)));
    }
}
