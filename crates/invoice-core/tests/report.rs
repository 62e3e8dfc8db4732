use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use invoice_core::report::SHEET_NAME;
use invoice_core::{
    compare_files, compare_tables, load_table, parse_csv_str, write_report, CellValue,
    CompareConfig, Comparison, Error, ReportFormat,
};
use rust_xlsxwriter::Workbook;

fn comparison() -> Comparison {
    let a = parse_csv_str(
        "Item Code,Description,Quantity,Price\nX1,Bolt,10,5\nX2,Nut,4,1.5\nX3,Washer,2,0.25\n",
        "a.csv",
    )
    .unwrap();
    let b = parse_csv_str(
        "Item Code,Description,Quantity,Price\nX1,Bolt,10,5\nX2,Nut,6,1.75\nX4,Screw,9,0.1\n",
        "b.csv",
    )
    .unwrap();
    compare_tables(a, b, &CompareConfig::default()).unwrap()
}

/// Write a small invoice workbook the way an operator's export would look
fn write_invoice_xlsx(path: &Path, rows: &[(&str, f64, f64)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, " Item Code ").unwrap();
    sheet.write_string(0, 1, "Quantity").unwrap();
    sheet.write_string(0, 2, "Price").unwrap();
    for (i, (code, qty, price)) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, *code).unwrap();
        sheet.write_number(r, 1, *qty).unwrap();
        sheet.write_number(r, 2, *price).unwrap();
    }
    workbook.save(path).unwrap();
}

fn read_sheet(path: &PathBuf) -> calamine::Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.worksheet_range(SHEET_NAME).unwrap()
}

fn is_blank(value: Option<&Data>) -> bool {
    matches!(value, None | Some(Data::Empty))
}

/// Raw stylesheet XML of a saved workbook
fn read_styles_xml(path: &Path) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut styles = String::new();
    archive
        .by_name("xl/styles.xml")
        .unwrap()
        .read_to_string(&mut styles)
        .unwrap();
    styles
}

#[test]
fn xlsx_report_layout_and_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Invoice_Comparison.xlsx");
    let comparison = comparison();

    let result = write_report(&comparison, &path, ReportFormat::Xlsx).unwrap();
    assert_eq!(result.rows_written, 4);
    // X1: nothing. X2: qty + price diff. X3: qty, price, Quantity_B missing.
    // X4: qty, price, Quantity_A missing.
    assert_eq!(result.highlighted_cells, 8);

    let range = read_sheet(&path);
    let header: Vec<String> = range.rows().next().unwrap().iter().map(|d| d.to_string()).collect();
    assert_eq!(
        header,
        vec![
            "Item Code",
            "Description_A",
            "Description_B",
            "Quantity_A",
            "Quantity_B",
            "Price_A",
            "Price_B",
            "Qty Diff",
            "Price Diff",
            "Missing In A",
            "Missing In B",
        ]
    );
    assert_eq!(range.height(), 5);

    // X2 row: quantities 4 vs 6, both flags set
    assert_eq!(range.get_value((2, 0)), Some(&Data::String("X2".to_string())));
    assert_eq!(range.get_value((2, 3)), Some(&Data::Float(4.0)));
    assert_eq!(range.get_value((2, 4)), Some(&Data::Float(6.0)));
    assert_eq!(range.get_value((2, 7)), Some(&Data::Bool(true)));
    assert_eq!(range.get_value((2, 8)), Some(&Data::Bool(true)));

    // X3 row: nothing on the B side
    assert_eq!(range.get_value((3, 0)), Some(&Data::String("X3".to_string())));
    assert!(is_blank(range.get_value((3, 4))));
    assert_eq!(range.get_value((3, 10)), Some(&Data::Bool(true)));

    // X4 row: only in B, appended after A's keys
    assert_eq!(range.get_value((4, 0)), Some(&Data::String("X4".to_string())));
    assert!(is_blank(range.get_value((4, 1))));
    assert_eq!(range.get_value((4, 9)), Some(&Data::Bool(true)));

    // Each band's fill is in the stylesheet (ARGB, opaque)
    let styles = read_styles_xml(&path);
    for rgb in ["FF9999", "FFFF99", "99CCFF"] {
        let fill = format!("rgb=\"FF{}\"", rgb);
        assert!(styles.contains(&fill), "fill {} not found in styles.xml", rgb);
    }
}

#[test]
fn xlsx_report_without_discrepancies_has_no_fills() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clean.xlsx");
    let a = parse_csv_str("Item Code,Quantity,Price\nX1,10,5\n", "a.csv").unwrap();
    let b = parse_csv_str("Item Code,Quantity,Price\nX1,10,5\n", "b.csv").unwrap();
    let comparison = compare_tables(a, b, &CompareConfig::default()).unwrap();

    let result = write_report(&comparison, &path, ReportFormat::Xlsx).unwrap();
    assert_eq!(result.highlighted_cells, 0);

    let styles = read_styles_xml(&path);
    for rgb in ["FF9999", "FFFF99", "99CCFF"] {
        let fill = format!("rgb=\"FF{}\"", rgb);
        assert!(!styles.contains(&fill), "unexpected fill {}", rgb);
    }
}

#[test]
fn csv_report_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comparison.csv");

    write_report(&comparison(), &path, ReportFormat::Csv).unwrap();

    let table = load_table(&path).unwrap();
    assert_eq!(table.column_count(), 11);
    assert_eq!(table.row_count(), 4);
    let missing_in_b = table.column_index("Missing In B").unwrap();
    assert_eq!(
        table.rows[2].cells[missing_in_b],
        CellValue::String("True".to_string())
    );
    let qty_b = table.column_index("Quantity_B").unwrap();
    assert_eq!(table.rows[2].cells[qty_b], CellValue::Empty);
}

#[test]
fn json_report_has_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comparison.json");

    write_report(&comparison(), &path, ReportFormat::Json).unwrap();

    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(doc["generated_at"].is_string());
    assert_eq!(doc["summary"]["records"], 4);
    assert_eq!(doc["summary"]["qty_diffs"], 3);
    assert_eq!(doc["summary"]["missing_in_a"], 1);
    assert_eq!(doc["comparison"]["config"]["key_column"], "Item Code");
}

#[test]
fn compare_xlsx_inputs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("invoice_a.xlsx");
    let b = dir.path().join("invoice_b.xlsx");
    write_invoice_xlsx(&a, &[("X1", 10.0, 5.0), ("X2", 1.0, 2.0)]);
    write_invoice_xlsx(&b, &[("X1", 10.0, 5.5), ("X3", 7.0, 1.0)]);

    let table = load_table(&a).unwrap();
    assert_eq!(table.columns[0].name, " Item Code ");
    assert_eq!(table.rows[0].cells[1], CellValue::Float(10.0));

    let result = compare_files(&a, &b, &CompareConfig::default()).unwrap();
    assert_eq!(result.record_count(), 3);

    let x1 = &result.records[0].flags;
    assert!(!x1.qty_diff && x1.price_diff);
    assert!(result.records[1].flags.missing_in_b);
    assert!(result.records[2].flags.missing_in_a);

    let out = dir.path().join("Invoice_Comparison.xlsx");
    write_report(&result, &out, ReportFormat::Xlsx).unwrap();
    assert!(out.exists());
}

#[test]
fn csv_inputs_keep_item_codes_exact() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    std::fs::write(&a, "Item Code,Quantity,Price\n00123,1,1\n").unwrap();
    std::fs::write(&b, "Item Code,Quantity,Price\n123,5,1\n").unwrap();

    let result = compare_files(&a, &b, &CompareConfig::default()).unwrap();
    assert_eq!(result.record_count(), 2);
    assert_eq!(result.records[0].key, CellValue::String("00123".to_string()));
    assert!(result.records[0].flags.missing_in_b);
    assert_eq!(result.records[1].key, CellValue::String("123".to_string()));
    assert!(result.records[1].flags.missing_in_a);

    let out = dir.path().join("Invoice_Comparison.xlsx");
    write_report(&result, &out, ReportFormat::Xlsx).unwrap();
    let range = read_sheet(&out);
    assert_eq!(range.get_value((1, 0)), Some(&Data::String("00123".to_string())));
    assert_eq!(range.get_value((2, 0)), Some(&Data::String("123".to_string())));
}

#[test]
fn csv_and_xlsx_inputs_read_key_whitespace_alike() {
    let dir = tempfile::tempdir().unwrap();
    let csv_a = dir.path().join("a.csv");
    let xlsx_a = dir.path().join("a.xlsx");
    let csv_b = dir.path().join("b.csv");
    std::fs::write(&csv_a, " Item Code ,Quantity,Price\n X1,10,5\n").unwrap();
    write_invoice_xlsx(&xlsx_a, &[(" X1", 10.0, 5.0)]);
    std::fs::write(&csv_b, "Item Code,Quantity,Price\nX1,10,5\n X1,10,5\n").unwrap();

    let from_csv = compare_files(&csv_a, &csv_b, &CompareConfig::default()).unwrap();
    let from_xlsx = compare_files(&xlsx_a, &csv_b, &CompareConfig::default()).unwrap();

    for result in [&from_csv, &from_xlsx] {
        assert_eq!(result.record_count(), 2);
        // " X1" only joins " X1", never "X1"
        assert_eq!(result.records[0].key, CellValue::String(" X1".to_string()));
        assert!(!result.records[0].flags.any());
        assert_eq!(result.records[1].key, CellValue::String("X1".to_string()));
        assert!(result.records[1].flags.missing_in_a);
    }
}

#[test]
fn schema_error_produces_no_report() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    std::fs::write(&a, "Code,Quantity,Price\nX1,1,1\n").unwrap();
    std::fs::write(&b, "Item Code,Quantity,Price\nX1,1,1\n").unwrap();

    let err = compare_files(&a, &b, &CompareConfig::default()).unwrap_err();
    assert!(matches!(err, Error::MissingKeyColumn { .. }));
    assert!(!dir.path().join("Invoice_Comparison.xlsx").exists());
}
