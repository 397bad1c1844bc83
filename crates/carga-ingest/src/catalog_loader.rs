//! 主檔目錄載入
//!
//! 每個 §外部介面 目錄一個載入器。必要欄位缺漏是結構性錯誤（整批中止），
//! 單列數值解析失敗則寬容處理（留空或跳過該列）。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use carga_core::{
    normalize_codes, ContainerCatalog, ContainerRecord, FlowCatalog, FlowRecord,
    LengthEfficiencyCatalog, LengthEfficiencyRecord, PartCatalog, PartRecord, SaturationBasis,
    StackingCatalog, StackingRule, VehicleCatalog, VehicleRecord,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::demand_reader::column_index;
use crate::Result;

/// 數值解析（容許巴西格式的小數逗號）
fn parse_decimal(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<Decimal>() {
        return Some(parsed);
    }
    trimmed.replace(',', ".").parse::<Decimal>().ok()
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    // 主檔偶見 "4.0" 形式的代碼
    parse_decimal(value).and_then(|d| d.trunc().to_string().parse::<u32>().ok())
}

/// 日期解析（ISO 與巴西日/月/年兩種格式）
fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

fn field<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("").trim()
}

fn open_reader<P: AsRef<Path>>(path: P) -> Result<(csv::Reader<File>, String)> {
    let label = path.as_ref().display().to_string();
    let file = File::open(&path)?;
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    Ok((reader, label))
}

// ---------------------------------------------------------------- 料件主檔

/// 載入料件主檔（BD_CADASTRO_PN）
pub fn load_part_catalog<P: AsRef<Path>>(path: P) -> Result<PartCatalog> {
    let (reader, label) = open_reader(path)?;
    parse_part_catalog(reader, &label)
}

pub fn parse_part_catalog<R: Read>(
    mut reader: csv::Reader<R>,
    file_label: &str,
) -> Result<PartCatalog> {
    let headers = reader.headers()?.clone();
    let drawing_idx = column_index(&headers, "DESENHO", file_label)?;
    let supplier_idx = column_index(&headers, "CÓD. FORNECEDOR", file_label)?;
    let name_idx = column_index(&headers, "FORNECEDOR", file_label)?;
    let description_idx = column_index(&headers, "DESCRIÇÃO", file_label)?;
    let container_idx = column_index(&headers, "MDR", file_label)?;
    let units_idx = column_index(&headers, "QME", file_label)?;
    let weight_idx = column_index(&headers, "PESO (Kg) MATERIAL", file_label)?;
    let updated_idx = column_index(&headers, "DESENHO ATUALIZAÇÃO", file_label)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record?;

        let drawing = field(&record, drawing_idx);
        let supplier = parse_int(field(&record, supplier_idx));
        let (drawing, supplier) = match (drawing.is_empty(), supplier) {
            (false, Some(code)) => (drawing.to_string(), code),
            _ => {
                dropped += 1;
                continue;
            }
        };

        let mut part = PartRecord::new(drawing, supplier, field(&record, name_idx).to_string())
            .with_description(field(&record, description_idx).to_string());

        let container = field(&record, container_idx);
        if !container.is_empty() {
            part = part.with_container(container.to_string());
        }
        if let Some(units) = parse_decimal(field(&record, units_idx)) {
            part = part.with_units_per_container(units);
        }
        if let Some(weight) = parse_decimal(field(&record, weight_idx)) {
            part = part.with_unit_weight(weight);
        }
        if let Some(date) = parse_date(field(&record, updated_idx)) {
            part = part.with_updated_on(date);
        }

        records.push(part);
    }

    if dropped > 0 {
        tracing::warn!("料件主檔 {file_label}: {dropped} 列鍵值無效，已跳過");
    }
    Ok(PartCatalog::from_records(records))
}

// ---------------------------------------------------------------- 車輛主檔

/// 載入車輛主檔（VEÍCULOS）
pub fn load_vehicle_catalog<P: AsRef<Path>>(path: P) -> Result<VehicleCatalog> {
    let (reader, label) = open_reader(path)?;
    parse_vehicle_catalog(reader, &label)
}

pub fn parse_vehicle_catalog<R: Read>(
    mut reader: csv::Reader<R>,
    file_label: &str,
) -> Result<VehicleCatalog> {
    let headers = reader.headers()?.clone();
    let code_idx = column_index(&headers, "COD VEICULO", file_label)?;
    let name_idx = column_index(&headers, "DESCRIÇÃO", file_label)?;
    let column_idx = column_index(&headers, "VEICULOS", file_label)?;
    let weight_idx = column_index(&headers, "PESO MAXIMO", file_label)?;
    let volume_idx = column_index(&headers, "CAPACIDADE M³", file_label).ok();
    let predecessor_idx = column_index(&headers, "VEICULO ANTERIOR", file_label).ok();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;

        let code = match parse_u32(field(&record, code_idx)) {
            Some(code) => code,
            None => continue,
        };

        let mut vehicle = VehicleRecord::new(code, field(&record, name_idx).to_string());

        let capacity_column = field(&record, column_idx);
        if !capacity_column.is_empty() {
            vehicle = vehicle.with_capacity_column(capacity_column.to_string());
        }
        if let Some(weight) = parse_decimal(field(&record, weight_idx)) {
            vehicle = vehicle.with_max_weight(weight);
        }
        if let Some(idx) = volume_idx {
            if let Some(volume) = parse_decimal(field(&record, idx)) {
                vehicle = vehicle.with_max_volume(volume);
            }
        }
        if let Some(idx) = predecessor_idx {
            if let Some(previous) = parse_u32(field(&record, idx)) {
                vehicle = vehicle.with_predecessor(previous);
            }
        }

        records.push(vehicle);
    }

    Ok(VehicleCatalog::from_records(records))
}

// ---------------------------------------------------------------- 容器主檔

/// 載入容器主檔（BD_CADASTRO_MDR）
///
/// 每車輛的容量欄位名稱由車輛主檔的欄位參照解析
pub fn load_container_catalog<P: AsRef<Path>>(
    path: P,
    vehicles: &VehicleCatalog,
) -> Result<ContainerCatalog> {
    let (reader, label) = open_reader(path)?;
    parse_container_catalog(reader, &label, vehicles)
}

pub fn parse_container_catalog<R: Read>(
    mut reader: csv::Reader<R>,
    file_label: &str,
    vehicles: &VehicleCatalog,
) -> Result<ContainerCatalog> {
    let headers = reader.headers()?.clone();
    let container_idx = column_index(&headers, "MDR", file_label)?;
    let description_idx = column_index(&headers, "DESCRIÇÃO2", file_label)?;
    let volume_idx = column_index(&headers, "VOLUME", file_label)?;
    let weight_idx = column_index(&headers, "MDR PESO", file_label)?;
    let palletizable_idx = column_index(&headers, "CAIXA PLÁSTICA", file_label)?;
    let per_pallet_idx = column_index(&headers, "CAIXAS POR PALLET", file_label)?;

    // 車輛容量欄位：主檔中缺欄的車輛組合維持未登錄（軟性 None）
    let capacity_columns: Vec<(usize, u32)> = vehicles
        .capacity_columns()
        .filter_map(|(column, code)| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .map(|idx| (idx, code))
        })
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;

        let container_type = field(&record, container_idx);
        if container_type.is_empty() {
            continue;
        }

        let palletizable = parse_int(field(&record, palletizable_idx)) == Some(1);
        let per_pallet = parse_decimal(field(&record, per_pallet_idx));

        let mut container = ContainerRecord::new(container_type.to_string())
            .with_description(field(&record, description_idx).to_string())
            .with_palletization(palletizable, per_pallet);

        if let Some(volume) = parse_decimal(field(&record, volume_idx)) {
            container = container.with_volume(volume);
        }
        if let Some(weight) = parse_decimal(field(&record, weight_idx)) {
            container = container.with_weight(weight);
        }
        for &(idx, code) in &capacity_columns {
            if let Some(capacity) = parse_decimal(field(&record, idx)) {
                container = container.with_capacity(code, capacity);
            }
        }

        records.push(container);
    }

    Ok(ContainerCatalog::from_records(records))
}

// ---------------------------------------------------------------- 堆疊規則

/// 載入堆疊相容規則（BD_EMPILHAMENTO_EMBALAGENS）
pub fn load_stacking_catalog<P: AsRef<Path>>(path: P) -> Result<StackingCatalog> {
    let (reader, label) = open_reader(path)?;
    parse_stacking_catalog(reader, &label)
}

pub fn parse_stacking_catalog<R: Read>(
    mut reader: csv::Reader<R>,
    file_label: &str,
) -> Result<StackingCatalog> {
    let headers = reader.headers()?.clone();
    let supplier_idx = column_index(&headers, "CÓD. FORNECEDOR", file_label)?;
    let base_idx = column_index(&headers, "MDR BASE", file_label)?;
    let overlay_idx = column_index(&headers, "MDR SOBREPOSTA", file_label)?;
    let ratio_idx = column_index(&headers, "EMPILHAMENTO BASE", file_label)?;

    let mut rules = Vec::new();
    for record in reader.records() {
        let record = record?;

        let supplier = parse_int(field(&record, supplier_idx));
        let base = field(&record, base_idx);
        let overlay = field(&record, overlay_idx);
        let ratio = parse_decimal(field(&record, ratio_idx));

        if let (Some(supplier), false, false, Some(ratio)) =
            (supplier, base.is_empty(), overlay.is_empty(), ratio)
        {
            rules.push(StackingRule::new(
                supplier,
                base.to_string(),
                overlay.to_string(),
                ratio,
            ));
        }
    }

    Ok(StackingCatalog::from_rules(rules))
}

// ---------------------------------------------------------------- 長度效率

/// 載入長度效率係數（BD_CADASTRO_MDR_PERDA_COMPRIMENTO）
///
/// 鍵欄位格式「供應商-容器類型」；每車輛一欄，欄名同容量欄位參照
pub fn load_efficiency_catalog<P: AsRef<Path>>(
    path: P,
    vehicles: &VehicleCatalog,
) -> Result<LengthEfficiencyCatalog> {
    let (reader, label) = open_reader(path)?;
    parse_efficiency_catalog(reader, &label, vehicles)
}

pub fn parse_efficiency_catalog<R: Read>(
    mut reader: csv::Reader<R>,
    file_label: &str,
    vehicles: &VehicleCatalog,
) -> Result<LengthEfficiencyCatalog> {
    let headers = reader.headers()?.clone();
    let key_idx = column_index(&headers, "CHAVE FORNE + MDR", file_label)?;

    let factor_columns: Vec<(usize, u32)> = vehicles
        .capacity_columns()
        .filter_map(|(column, code)| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .map(|idx| (idx, code))
        })
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;

        // 鍵「供應商-MDR」：容器代碼本身可含連字號，只切第一段
        let key = field(&record, key_idx);
        let mut parts = key.splitn(2, '-');
        let supplier = parts.next().and_then(parse_int);
        let container = parts.next().map(|s| s.trim().to_string());

        let (supplier, container) = match (supplier, container) {
            (Some(supplier), Some(container)) if !container.is_empty() => (supplier, container),
            _ => continue,
        };

        let mut efficiency = LengthEfficiencyRecord::new(supplier, container);
        for &(idx, code) in &factor_columns {
            if let Some(factor) = parse_decimal(field(&record, idx)) {
                efficiency = efficiency.with_factor(code, factor);
            }
        }

        records.push(efficiency);
    }

    Ok(LengthEfficiencyCatalog::from_records(records))
}

// ---------------------------------------------------------------- 路線主檔

/// 載入路線主檔（FLUXO）
pub fn load_flow_catalog<P: AsRef<Path>>(path: P) -> Result<FlowCatalog> {
    let (reader, label) = open_reader(path)?;
    parse_flow_catalog(reader, &label)
}

pub fn parse_flow_catalog<R: Read>(
    mut reader: csv::Reader<R>,
    file_label: &str,
) -> Result<FlowCatalog> {
    let headers = reader.headers()?.clone();
    let flow_idx = column_index(&headers, "COD FLUXO", file_label)?;
    let destination_idx = column_index(&headers, "COD DESTINO", file_label)?;
    let destination_name_idx = column_index(&headers, "NOME DESTINO", file_label)?;
    let supplier_idx = column_index(&headers, "COD FORNECEDOR", file_label)?;
    let vehicle_idx = column_index(&headers, "VEICULO PRINCIPAL", file_label)?;
    let basis_idx = column_index(&headers, "TIPO SATURACAO", file_label)?;
    let carrier_idx = column_index(&headers, "TRANSPORTADORA", file_label)?;
    let technology_idx = column_index(&headers, "TECNOLOGIA", file_label)?;
    let mode_idx = column_index(&headers, "MOT", file_label)?;
    let ims_idx = column_index(&headers, "COD IMS", file_label).ok();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;

        let flow_id = field(&record, flow_idx);
        if flow_id.is_empty() {
            continue;
        }

        let mut flow = FlowRecord::new(
            flow_id.to_string(),
            normalize_codes(field(&record, destination_idx)),
            normalize_codes(field(&record, supplier_idx)),
        )
        .with_destination_name(field(&record, destination_name_idx).to_string())
        .with_vehicle_name(field(&record, vehicle_idx).to_string())
        .with_basis(SaturationBasis::parse(field(&record, basis_idx)))
        .with_carrier(field(&record, carrier_idx).to_string())
        .with_technology(field(&record, technology_idx).to_string())
        .with_transport_mode(field(&record, mode_idx).to_string());

        if let Some(idx) = ims_idx {
            let ims = field(&record, idx);
            if !ims.is_empty() {
                flow = flow.with_ims_code(ims.to_string());
            }
        }

        records.push(flow);
    }

    Ok(FlowCatalog::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_reader(content: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes())
    }

    fn vehicles() -> VehicleCatalog {
        VehicleCatalog::from_records(vec![
            VehicleRecord::new(4, "CARRETA".to_string())
                .with_capacity_column("14 x 2,4 x 2,78".to_string()),
            VehicleRecord::new(3, "TRUCK 3M".to_string())
                .with_capacity_column("7,5 x 2,4 x 2,6".to_string()),
        ])
    }

    #[test]
    fn test_parse_part_catalog() {
        let content = "\
DESENHO,CÓD. FORNECEDOR,FORNECEDOR,DESCRIÇÃO,MDR,QME,PESO (Kg) MATERIAL,DESENHO ATUALIZAÇÃO
12345,770001,FORNECEDOR A,SUPORTE,MDR-A,100,\"2,5\",2025-05-01
12345,770001,FORNECEDOR A,SUPORTE V2,MDR-B,50,2.5,2025-06-01
,770002,FORNECEDOR B,SEM DESENHO,MDR-A,10,1.0,2025-01-01
";
        let catalog = parse_part_catalog(csv_reader(content), "pn.csv").unwrap();

        // 版次較新的 MDR-B 勝出；鍵值無效列被跳過
        assert_eq!(catalog.container_for_drawing("12345"), Some("MDR-B"));
        // 小數逗號被接受
        let old = catalog.record("12345", "MDR-A").unwrap();
        assert_eq!(old.unit_weight, Some(Decimal::new(25, 1)));
    }

    #[test]
    fn test_parse_part_catalog_missing_column() {
        let content = "DESENHO,CÓD. FORNECEDOR\n123,770001\n";
        let error = parse_part_catalog(csv_reader(content), "pn.csv").unwrap_err();
        assert!(matches!(
            error,
            crate::IngestError::MissingColumn { .. }
        ));
    }

    #[test]
    fn test_parse_vehicle_catalog() {
        let content = "\
COD VEICULO,DESCRIÇÃO,VEICULOS,PESO MAXIMO,CAPACIDADE M³,VEICULO ANTERIOR
4,CARRETA,\"14 x 2,4 x 2,78\",24000,90,3
3,TRUCK 3M,\"7,5 x 2,4 x 2,6\",13000,45,
";
        let catalog = parse_vehicle_catalog(csv_reader(content), "veiculos.csv").unwrap();

        assert_eq!(catalog.code_by_name("carreta"), Some(4));
        assert_eq!(catalog.max_weight(4), Some(Decimal::from(24000)));
        assert_eq!(catalog.predecessor(4), Some(3));
        // 未明示降階者走預設鏈
        assert_eq!(catalog.predecessor(3), Some(1));
    }

    #[test]
    fn test_parse_container_catalog_with_capacity_columns() {
        let content = "\
MDR,DESCRIÇÃO2,VOLUME,MDR PESO,CAIXA PLÁSTICA,CAIXAS POR PALLET,\"14 x 2,4 x 2,78\",\"7,5 x 2,4 x 2,6\"
MDR-A,CAIXA GRANDE,\"1,2\",15,1,8,28,14
MDR-B,RACK METALICO,2.0,80,0,4,30,
";
        let catalog =
            parse_container_catalog(csv_reader(content), "mdr.csv", &vehicles()).unwrap();

        assert_eq!(catalog.capacity("MDR-A", 4), Some(Decimal::from(28)));
        assert_eq!(catalog.capacity("MDR-A", 3), Some(Decimal::from(14)));
        // 空容量儲存格 → 組合未登錄
        assert_eq!(catalog.capacity("MDR-B", 3), None);

        let rack = catalog.record("MDR-B").unwrap();
        // 非棧板化：每棧板數被忽略
        assert_eq!(rack.effective_containers_per_pallet(), Decimal::ONE);
    }

    #[test]
    fn test_parse_stacking_catalog() {
        let content = "\
CÓD. FORNECEDOR,MDR BASE,MDR SOBREPOSTA,EMPILHAMENTO BASE
770001,MDR-A,MDR-B,2
770001,MDR-A,,1
";
        let catalog = parse_stacking_catalog(csv_reader(content), "emp.csv").unwrap();

        assert_eq!(catalog.len(), 1);
        let rule = catalog.rule(770001, "MDR-A", "MDR-B").unwrap();
        assert_eq!(rule.base_units_per_overlay, Decimal::from(2));
    }

    #[test]
    fn test_parse_efficiency_catalog() {
        let content = "\
CHAVE FORNE + MDR,\"14 x 2,4 x 2,78\"
770001-MDR-A,\"0,85\"
";
        let catalog =
            parse_efficiency_catalog(csv_reader(content), "efi.csv", &vehicles()).unwrap();

        // 鍵只切第一個連字號：容器代碼保留 MDR-A
        assert_eq!(catalog.factor(770001, "MDR-A", 4), Decimal::new(85, 2));
        assert_eq!(catalog.factor(770001, "MDR-A", 3), Decimal::ONE);
    }

    #[test]
    fn test_parse_flow_catalog() {
        let content = "\
COD FLUXO,COD DESTINO,NOME DESTINO,COD FORNECEDOR,VEICULO PRINCIPAL,TIPO SATURACAO,TRANSPORTADORA,TECNOLOGIA,MOT,COD IMS
F-001,1080 / 1046,PLANTA BETIM,770001/770002,CARRETA,Volume,TRANSP X,MILK RUN,RODO,123/456
";
        let catalog = parse_flow_catalog(csv_reader(content), "fluxo.csv").unwrap();

        let flow = &catalog.records()[0];
        assert_eq!(flow.destination_codes, vec!["1080", "1046"]);
        assert_eq!(flow.supplier_codes, vec!["770001", "770002"]);
        assert_eq!(flow.saturation_basis, SaturationBasis::Volume);
        assert_eq!(flow.ims_code.as_deref(), Some("123/456"));
    }
}
