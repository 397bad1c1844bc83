//! 整批彙總（艙單層級的總覽數字）

use carga_core::{EnrichedLine, VehicleCatalog};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 整批彙總：一次計算的車隊總覽
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// 總佔用（%，所有行體積飽和度合計）
    pub total_occupation_pct: Decimal,

    /// 所需車輛數
    pub vehicle_count: u32,

    /// 總體積（m³）
    pub total_volume: Decimal,

    /// 總重量（kg）
    pub total_weight: Decimal,

    /// 容器總數
    pub total_packages: Decimal,

    /// 每車有效裝載比例（%）
    pub usable_capacity_pct: Decimal,

    /// 每車有效裝載體積（m³）
    pub usable_capacity_m3: Decimal,

    /// 剩餘容積（m³；選定車輛無容積登錄時為 None）
    pub remaining_volume: Option<Decimal>,
}

/// 整批彙總計算器
pub struct SummaryCalculator;

impl SummaryCalculator {
    /// 由飽和度標註後的濃縮行計算整批總覽
    ///
    /// `selected_vehicle` 為本批次選定的車輛等級，剩餘容積以其最大容積推算
    pub fn summarize(
        lines: &[EnrichedLine],
        vehicles: &VehicleCatalog,
        selected_vehicle: u32,
    ) -> RunSummary {
        let total_occupation: Decimal = lines.iter().filter_map(|l| l.saturation_volume_pct).sum();
        let total_volume: Decimal = lines.iter().filter_map(|l| l.volume_m3).sum();
        let total_weight: Decimal = lines.iter().filter_map(|l| l.total_weight).sum();
        let total_packages: Decimal = lines.iter().filter_map(|l| l.package_count).sum();

        let vehicle_count = if total_occupation > Decimal::ZERO {
            (total_occupation / Decimal::from(100))
                .ceil()
                .to_u32()
                .unwrap_or(0)
        } else {
            0
        };

        let (usable_capacity_pct, usable_capacity_m3) = if vehicle_count > 0 {
            let count = Decimal::from(vehicle_count);
            (
                (total_occupation / count).round_dp(2),
                (total_volume / count).round_dp(1),
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        let remaining_volume = vehicles
            .max_volume(selected_vehicle)
            .map(|max| (max * Decimal::from(vehicle_count) - total_volume).round_dp(1));

        RunSummary {
            total_occupation_pct: total_occupation.round_dp(2),
            vehicle_count,
            total_volume: total_volume.round_dp(1),
            total_weight: total_weight.round_dp(1),
            total_packages,
            usable_capacity_pct,
            usable_capacity_m3,
            remaining_volume,
        }
    }
}
