//! The estimate command

use anyhow::{Context, Result};
use colored::Colorize;
use sizer_lib::{ComputeRequest, ComputeResponse, Dataset, SizingEngine, WorkloadNature};
use std::path::PathBuf;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_fit, format_gb, format_iops, print_info, print_rows, print_warning, OutputFormat,
};

/// Where the request comes from
#[derive(Debug, Clone)]
pub enum RequestSource {
    File(PathBuf),
    Flags {
        documents: u64,
        doc_size: u64,
        nature: WorkloadNature,
    },
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Services")]
    services: String,
    #[tabled(rename = "Nodes")]
    nodes: u64,
    #[tabled(rename = "vCPU")]
    cpu: u64,
    #[tabled(rename = "RAM")]
    ram: String,
    #[tabled(rename = "Disk")]
    disk: String,
    #[tabled(rename = "IOPS")]
    disk_io: String,
    #[tabled(rename = "Disk Type")]
    disk_type: String,
    #[tabled(rename = "Fit")]
    fit: String,
}

/// Build the request to size
pub fn build_request(source: &RequestSource) -> Result<ComputeRequest> {
    match source {
        RequestSource::File(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read request file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid request in {}", path.display()))
        }
        RequestSource::Flags {
            documents,
            doc_size,
            nature,
        } => Ok(ComputeRequest {
            dataset: Dataset {
                no_of_documents: *documents,
                average_document_size: *doc_size,
                ..Dataset::default()
            },
            workload_nature: nature.to_string(),
            ..ComputeRequest::default()
        }),
    }
}

/// Run locally, or on the server when `client` is given
pub async fn run_estimate(
    engine: &SizingEngine,
    client: Option<&ApiClient>,
    source: &RequestSource,
    format: OutputFormat,
) -> Result<()> {
    let request = build_request(source)?;

    let response = match client {
        Some(client) => client.estimate(&request).await?,
        None => engine.estimate(&request),
    };

    render(&response, format)
}

fn render(response: &ComputeResponse, format: OutputFormat) -> Result<()> {
    let rows: Vec<GroupRow> = response
        .service_groups_results
        .iter()
        .enumerate()
        .map(|(index, group)| GroupRow {
            index: index + 1,
            services: group.services.join(", "),
            nodes: group.nodes,
            cpu: group.estimated_cpu,
            ram: format_gb(group.estimated_ram),
            disk: format_gb(group.estimated_disk),
            disk_io: format_iops(group.estimated_disk_io),
            disk_type: group.disk_type.clone(),
            fit: color_fit(group.instance_satisfies_requirement),
        })
        .collect();

    if let OutputFormat::Table = format {
        let summary = &response.summary;
        println!("{}", "Sizing Summary".bold());
        println!("{}", "=".repeat(50));
        println!("Cluster option:         {}", summary.cluster_option.cyan());
        println!("Workload type:          {}", summary.workload_type);
        println!("Service groups:         {}", summary.service_groups);
        println!("Nodes allocated:        {}", summary.nodes_allocated);
        println!("Services:               {}", summary.services.join(", "));
        println!();
    }

    print_rows(&rows, response, format)?;

    if let OutputFormat::Table = format {
        let undersized = response
            .service_groups_results
            .iter()
            .filter(|g| !g.instance_satisfies_requirement)
            .count();
        if undersized > 0 {
            println!();
            print_warning(&format!(
                "{} group(s) need more than the largest instance; add nodes to spread the load",
                undersized
            ));
        } else if response.service_groups_results.is_empty() {
            print_info("No service groups to size");
        }
    }

    Ok(())
}
