//! 飽和度整合（堆疊貢獻併入與逐行回配）

use crate::aggregation::SaturationRow;
use crate::stacking::StackingRow;
use carga_core::EnrichedLine;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// 飽和度整合計算器
///
/// 兩個相依的階段，各自產生新的不可變結果：
/// 1. 飽和度行併入堆疊貢獻，得出總飽和度與單容器飽和度；
/// 2. 濃縮行依其容器數按比例回配飽和度百分比。
/// 逐行飽和度依賴由全體行算出的聚合值，順序不可顛倒。
pub struct IntegrationCalculator;

impl IntegrationCalculator {
    /// 階段一：併入堆疊貢獻
    ///
    /// 總飽和度 = (基礎飽和度 + Σ 以該行為底層的堆疊飽和度) × 長度效率。
    /// 無堆疊貢獻時加項為零（恆等式）；容量未知的行維持 None，不參與運算。
    pub fn integrate(rows: &[SaturationRow], stacks: &[StackingRow]) -> Vec<SaturationRow> {
        rows.iter()
            .map(|row| {
                let mut integrated = row.clone();

                let base = match row.base_saturation() {
                    Some(base) => base,
                    None => return integrated,
                };

                let stacked_sum: Decimal = stacks
                    .iter()
                    .filter(|s| {
                        s.supplier_code == row.supplier_code
                            && s.base_container == row.container_type
                    })
                    .filter_map(|s| s.saturation)
                    .sum();

                let total = (base + stacked_sum) * row.length_efficiency;
                integrated.total_saturation = Some(total);

                if row.total_packages > Decimal::ZERO {
                    integrated.saturation_per_package = Some(total / row.total_packages);
                }

                integrated
            })
            .collect()
    }

    /// 階段二：逐行回配
    ///
    /// 每行重建（不就地修改）：
    /// - 體積飽和度 = 容器數 × 單容器飽和度 × 100（2 位小數）
    /// - 重量飽和度 = 總重量 / 車輛最大載重 × 100（2 位小數）
    /// - 有效佔用 = 兩者較大值
    pub fn annotate(lines: &[EnrichedLine], rows: &[SaturationRow]) -> Vec<EnrichedLine> {
        let per_package: HashMap<(i64, &str), Decimal> = rows
            .iter()
            .filter_map(|row| {
                row.saturation_per_package
                    .map(|s| ((row.supplier_code, row.container_type.as_str()), s))
            })
            .collect();

        lines
            .iter()
            .map(|line| {
                let mut annotated = line.clone();

                annotated.saturation_volume_pct = match (&line.container_type, line.package_count) {
                    (Some(container), Some(count)) => per_package
                        .get(&(line.supplier_code, container.as_str()))
                        .map(|unit| (count * unit * Decimal::from(100)).round_dp(2)),
                    _ => None,
                };

                annotated.saturation_weight_pct =
                    match (line.total_weight, line.vehicle_max_weight) {
                        (Some(weight), Some(max)) if max > Decimal::ZERO => {
                            Some((weight / max * Decimal::from(100)).round_dp(2))
                        }
                        _ => None,
                    };

                annotated.effective_capacity_pct =
                    match (annotated.saturation_volume_pct, annotated.saturation_weight_pct) {
                        (Some(volume), Some(weight)) => Some(volume.max(weight)),
                        (Some(volume), None) => Some(volume),
                        (None, Some(weight)) => Some(weight),
                        (None, None) => None,
                    };

                annotated
            })
            .collect()
    }
}
