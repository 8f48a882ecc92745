use crate::domain::model::{
    BiologicalProduct, ChemicalProduct, CompatibilityRecord, CompatibilityResult, ProductId,
};
use crate::utils::error::{CompatError, Result};
use crate::utils::text::fold_key;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;

/// A column located by header. Aliases are compared after [`fold_key`] and
/// tried in order, so the first alias wins when several headers match.
struct ColumnSpec {
    label: &'static str,
    aliases: &'static [&'static str],
    required: bool,
}

const ID: ColumnSpec = ColumnSpec {
    label: "ID",
    aliases: &["id", "codigo"],
    required: true,
};

const NAME: ColumnSpec = ColumnSpec {
    label: "Name",
    aliases: &["name", "nome", "produto", "nomedoproduto"],
    required: true,
};

const CHEMICAL_ID: ColumnSpec = ColumnSpec {
    label: "ChemicalID",
    aliases: &["chemicalid", "idquimico", "quimicoid", "idprodutoquimico"],
    required: true,
};

const BIOLOGICAL_ID: ColumnSpec = ColumnSpec {
    label: "BiologicalID",
    aliases: &["biologicalid", "idbiologico", "biologicoid"],
    required: true,
};

const RESULT: ColumnSpec = ColumnSpec {
    label: "Result",
    aliases: &["result", "resultado"],
    required: true,
};

const NOTES: ColumnSpec = ColumnSpec {
    label: "Notes",
    aliases: &["notes", "observacoes", "observacao", "obs"],
    required: false,
};

/// Rows of one table, restricted to the requested columns.
struct TableRows {
    table: String,
    columns: Vec<Option<usize>>,
    rows: Vec<(u64, StringRecord)>,
}

impl TableRows {
    fn read(table: &str, bytes: &[u8], specs: &[&ColumnSpec]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(fold_key).collect();

        let mut columns = Vec::with_capacity(specs.len());
        for spec in specs {
            let index = spec
                .aliases
                .iter()
                .find_map(|alias| headers.iter().position(|h| *h == fold_key(alias)));
            if index.is_none() && spec.required {
                return Err(CompatError::data_format(
                    table,
                    format!("missing column '{}'", spec.label),
                ));
            }
            columns.push(index);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            rows.push((line, record));
        }

        Ok(Self {
            table: table.to_string(),
            columns,
            rows,
        })
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: usize) -> Option<&'r str> {
        self.columns[column]
            .and_then(|index| record.get(index))
            .filter(|value| !value.is_empty())
    }

    fn required_cell<'r>(
        &self,
        record: &'r StringRecord,
        column: usize,
        label: &str,
        line: u64,
    ) -> Result<&'r str> {
        self.cell(record, column).ok_or_else(|| {
            CompatError::data_format(&self.table, format!("line {}: empty '{}' cell", line, label))
        })
    }
}

/// Spreadsheets export integral numbers as `1.0` in some sheets and `1` in others.
fn normalize_id(raw: &str) -> ProductId {
    let trimmed = raw.trim();
    let id = match trimmed.split_once('.') {
        Some((whole, fraction))
            if !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && !fraction.is_empty()
                && fraction.bytes().all(|b| b == b'0') =>
        {
            whole
        }
        _ => trimmed,
    };
    ProductId::new(id)
}

fn parse_products(table: &str, bytes: &[u8]) -> Result<Vec<(ProductId, String)>> {
    let rows = TableRows::read(table, bytes, &[&ID, &NAME])?;
    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    let mut products = Vec::with_capacity(rows.rows.len());

    for (line, record) in &rows.rows {
        let id = normalize_id(rows.required_cell(record, 0, ID.label, *line)?);
        let name = rows.required_cell(record, 1, NAME.label, *line)?.to_string();

        if !seen_ids.insert(id.clone()) {
            return Err(CompatError::data_format(
                table,
                format!("line {}: duplicate ID '{}'", line, id),
            ));
        }
        if !seen_names.insert(name.clone()) {
            tracing::warn!(
                "Table '{}' line {}: duplicate name '{}', lookups use the first row",
                table,
                line,
                name
            );
        }
        products.push((id, name));
    }

    Ok(products)
}

pub fn parse_chemicals(table: &str, bytes: &[u8]) -> Result<Vec<ChemicalProduct>> {
    Ok(parse_products(table, bytes)?
        .into_iter()
        .map(|(id, name)| ChemicalProduct { id, name })
        .collect())
}

pub fn parse_biologicals(table: &str, bytes: &[u8]) -> Result<Vec<BiologicalProduct>> {
    Ok(parse_products(table, bytes)?
        .into_iter()
        .map(|(id, name)| BiologicalProduct { id, name })
        .collect())
}

/// Content of a result cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCell {
    Tested(CompatibilityResult),
    /// Blank or explicitly marked as not tested.
    Untested,
    Unknown,
}

pub fn parse_result(value: &str) -> ResultCell {
    match fold_key(value).as_str() {
        "" | "naotestado" | "naotestada" | "untested" | "pendente" => ResultCell::Untested,
        "compativel" | "compatible" => ResultCell::Tested(CompatibilityResult::Compatible),
        "incompativel" | "incompatible" => ResultCell::Tested(CompatibilityResult::Incompatible),
        _ => ResultCell::Unknown,
    }
}

pub fn parse_compatibilities(table: &str, bytes: &[u8]) -> Result<Vec<CompatibilityRecord>> {
    let rows = TableRows::read(table, bytes, &[&CHEMICAL_ID, &BIOLOGICAL_ID, &RESULT, &NOTES])?;
    let mut records = Vec::with_capacity(rows.rows.len());

    for (line, record) in &rows.rows {
        let chemical_id = normalize_id(rows.required_cell(record, 0, CHEMICAL_ID.label, *line)?);
        let biological_id =
            normalize_id(rows.required_cell(record, 1, BIOLOGICAL_ID.label, *line)?);
        let raw_result = rows.cell(record, 2).unwrap_or("");

        let result = match parse_result(raw_result) {
            ResultCell::Untested => {
                tracing::debug!(
                    "Table '{}' line {}: no result for {}/{}, treated as untested",
                    table,
                    line,
                    chemical_id,
                    biological_id
                );
                continue;
            }
            ResultCell::Tested(result) => result,
            ResultCell::Unknown => {
                return Err(CompatError::data_format(
                    table,
                    format!("line {}: unknown result '{}'", line, raw_result),
                ));
            }
        };

        records.push(CompatibilityRecord {
            chemical_id,
            biological_id,
            result,
            notes: rows.cell(record, 3).map(str::to_string),
        });
    }

    Ok(records)
}
