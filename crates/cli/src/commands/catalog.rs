//! Catalog and preset listing commands

use anyhow::Result;
use sizer_lib::{Instance, InstanceCatalog, NaturePresets};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{format_gb, print_rows, OutputFormat};

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "vCPU")]
    vcpu: u64,
    #[tabled(rename = "RAM")]
    ram: String,
    #[tabled(rename = "GB per vCPU")]
    ratio: u64,
}

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "Nature")]
    nature: &'static str,
    #[tabled(rename = "Groups")]
    groups: String,
    #[tabled(rename = "Resident %")]
    resident_ratio: u64,
    #[tabled(rename = "Index %")]
    indexes: u64,
    #[tabled(rename = "FTS %")]
    full_text_search: u64,
    #[tabled(rename = "Reads/s")]
    reads: u64,
    #[tabled(rename = "Writes/s")]
    writes: u64,
    #[tabled(rename = "Deletes/s")]
    deletes: u64,
    #[tabled(rename = "SQL/s")]
    sql: u64,
}

pub async fn show_catalog(
    local: &InstanceCatalog,
    client: Option<&ApiClient>,
    format: OutputFormat,
) -> Result<()> {
    let catalog = match client {
        Some(client) => client.get::<InstanceCatalog>("catalog").await?,
        None => local.clone(),
    };

    let rows: Vec<InstanceRow> = catalog.instances().iter().map(instance_row).collect();
    print_rows(&rows, &catalog, format)
}

pub async fn show_presets(
    local: &NaturePresets,
    client: Option<&ApiClient>,
    format: OutputFormat,
) -> Result<()> {
    let presets = match client {
        Some(client) => client.get::<NaturePresets>("presets").await?,
        None => local.clone(),
    };

    let rows = preset_rows(&presets);
    print_rows(&rows, &presets, format)
}

fn instance_row(instance: &Instance) -> InstanceRow {
    InstanceRow {
        vcpu: instance.vcpu,
        ram: format_gb(instance.ram),
        ratio: instance.ram.checked_div(instance.vcpu).unwrap_or(0),
    }
}

fn preset_rows(presets: &NaturePresets) -> Vec<PresetRow> {
    [
        ("read", &presets.read),
        ("write", &presets.write),
        ("readwrite", &presets.readwrite),
    ]
    .into_iter()
    .map(|(nature, preset)| PresetRow {
        nature,
        groups: preset
            .service_groups
            .iter()
            .map(|g| format!("[{}] x{} {}", g.services.join(","), g.no_of_nodes, g.disk_type))
            .collect::<Vec<_>>()
            .join("; "),
        resident_ratio: preset.dataset.resident_ratio,
        indexes: preset.dataset.percent_indexes_of_dataset,
        full_text_search: preset.dataset.percent_full_text_search_of_dataset,
        reads: preset.workload.read_per_sec,
        writes: preset.workload.writes_per_sec,
        deletes: preset.workload.deletes_per_sec,
        sql: preset.workload.sql_queries_per_sec,
    })
    .collect()
}
