use boothkit_io_xlsx::{
    SpecXlsxWriteOptions, XlsxWriter, load_document_from_path, load_documents_from_bytes,
    read_workbook_from_path,
};
use boothkit_order::{EnumCellValue, OrderFormMerger, SpecMergeOptions, SpreadsheetSource};
use rust_xlsxwriter::Workbook;

fn write_order_form(path: &std::path::Path, company: &str) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("신청서").unwrap();
    worksheet.write_string(2, 2, company).unwrap();
    worksheet.write_string(3, 2, "Kim").unwrap();
    worksheet.write_number(2, 6, 117.0).unwrap();
    worksheet.write_string(8, 1, "Cabinet").unwrap();
    worksheet.write_string(8, 4, "Cabinet(3)").unwrap();
    worksheet.write_string(9, 1, "의자").unwrap();
    worksheet.write_number(9, 3, 2.0).unwrap();
    worksheet.write_string(30, 1, "Extra Chair").unwrap();
    worksheet.write_number(30, 4, 2.0).unwrap();
    worksheet.write_string(30, 5, "10,000").unwrap();
    workbook.save(path).unwrap();
}

#[test]
fn test_order_form_file_is_merged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("acme.xlsx");
    write_order_form(&path, "Acme Dental");

    let document = load_document_from_path(&path).unwrap();
    assert_eq!(document.name, "acme.xlsx");

    let mut merger = OrderFormMerger::with_defaults(SpecMergeOptions::default()).unwrap();
    let report = merger.merge_all(&[document]).unwrap();
    let booth = &report.documents[0];
    assert_eq!(booth.meta.company, "Acme Dental");
    assert_eq!(booth.meta.booth_number, "117");
    assert_eq!(booth.ledger.get("Cabinet").map(|item| item.quantity), Some(3));
    assert_eq!(booth.ledger.get("의자").map(|item| item.line_total), Some(10_000));
    assert_eq!(
        booth.ledger.get("Extra Chair").map(|item| item.line_total),
        Some(20_000)
    );
}

#[test]
fn test_uploaded_bytes_with_one_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beta.xlsx");
    write_order_form(&path, "Beta Clinic");
    let v_bytes = std::fs::read(&path).unwrap();

    let l_documents = load_documents_from_bytes(&[
        ("beta.xlsx", v_bytes),
        ("notes.txt", b"plain text".to_vec()),
    ]);
    let mut merger = OrderFormMerger::with_defaults(SpecMergeOptions::default()).unwrap();
    let report = merger.merge_all(&l_documents).unwrap();

    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].meta.company, "Beta Clinic");
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].document, "notes.txt");
}

#[test]
fn test_report_tables_round_trip_through_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path_form = dir.path().join("acme.xlsx");
    write_order_form(&path_form, "Acme Dental");

    let options = SpecMergeOptions {
        if_build_detail: true,
        ..Default::default()
    };
    let mut merger = OrderFormMerger::with_defaults(options.clone()).unwrap();
    let report = merger
        .merge_all(&[load_document_from_path(&path_form).unwrap()])
        .unwrap();

    let path_out = dir.path().join("merged.xlsx");
    let mut writer = XlsxWriter::new(&path_out, SpecXlsxWriteOptions::default());
    report.export(&options, &mut writer).unwrap();
    writer.close().unwrap();
    writer.close().unwrap();
    assert!(writer.write_sheet(&Default::default(), "late").is_err());
    assert_eq!(writer.report().sheets.len(), 3);

    let source = read_workbook_from_path(&path_out).unwrap();
    assert_eq!(source.list_sheets().unwrap(), vec!["Merged", "Pivot", "Detail"]);

    let grid = source.read_grid("Merged").unwrap();
    assert_eq!(grid.cell(0, 0), &EnumCellValue::String("source".to_string()));
    assert_eq!(grid.cell(0, 7), &EnumCellValue::String("item_name".to_string()));
    assert_eq!(grid.height(), 1 + booth_item_count(&report));

    let n_row_cabinet = (1..grid.height())
        .find(|n_row| grid.cell(*n_row, 7) == &EnumCellValue::String("Cabinet".to_string()))
        .unwrap();
    assert_eq!(grid.cell(n_row_cabinet, 8), &EnumCellValue::Number(3.0));
    assert_eq!(grid.cell(n_row_cabinet, 10), &EnumCellValue::Number(120_000.0));
    assert_eq!(
        grid.cell(n_row_cabinet, 1),
        &EnumCellValue::String("Acme Dental".to_string())
    );

    let grid_pivot = source.read_grid("Pivot").unwrap();
    assert_eq!(grid_pivot.cell(0, 0), &EnumCellValue::String("company".to_string()));
    assert_eq!(grid_pivot.height(), 2);
}

fn booth_item_count(report: &boothkit_order::MergedReport) -> usize {
    report.documents.iter().map(|doc| doc.ledger.len()).sum()
}
