//! Client-paginated table over in-memory records.
//!
//! Run with: cargo run --example client_table

use datagrid_lib::Table;
use datagrid_lib::TableConfig;
use datagrid_lib::export::ExportFormat;
use datagrid_lib::export::ExportOptions;
use datagrid_lib::model::Column;
use datagrid_lib::model::ColumnType;
use datagrid_lib::model::Record;
use datagrid_lib::query::Filter;
use datagrid_lib::query::SortConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let columns = vec![
        Column::new("name", "Name").sortable(),
        Column::new("age", "Age").with_type(ColumnType::Number).sortable(),
        Column::new("active", "Active").with_type(ColumnType::Boolean),
    ];
    let records = vec![
        Record::new().set("name", "Alice").set("age", 30).set("active", true),
        Record::new().set("name", "Bob").set("age", 25).set("active", false),
        Record::new().set("name", "Carol").set("age", 41).set("active", true),
    ];

    let table = Table::new(TableConfig::new(columns, records).with_per_page(2))?;
    table.load().await;
    table.set_sort(SortConfig::desc("age")).await;
    table.set_filter("active", Filter::simple(true)).await;

    let state = table.state();
    println!("{} matching rows", state.pagination.total);
    for row in table.display_items() {
        let cells: Vec<String> = table
            .columns()
            .iter()
            .map(|column| table.format_cell(row.get(&column.key), column, &row))
            .collect();
        println!("{}", cells.join(" | "));
    }

    let document = table.export(&ExportOptions::new(ExportFormat::Csv))?;
    println!("\n{}:\n{}", document.file_name, document.as_text().unwrap_or_default());
    Ok(())
}
