use std::collections::BTreeMap;

use boothkit_io_xlsx::{
    SpecXlsxWriteOptions, XlsxWriter, load_documents_from_bytes, load_documents_from_paths,
};
use boothkit_order::{
    EnumTemplateProfile, MergedReport, OrderFormError, OrderFormMerger, SpecDocumentWarning,
    SpecMergeOptions, SpecSourceDocument,
};
use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "boothkit.order.merge.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

type TypeLedgerRow = (String, String, String, u64, u64, u64, String);

#[pyclass(name = "SpecDocumentWarning")]
#[derive(Debug, Clone)]
struct PySpecDocumentWarning {
    #[pyo3(get)]
    document: String,
    #[pyo3(get)]
    exception: String,
}

impl From<SpecDocumentWarning> for PySpecDocumentWarning {
    fn from(warning: SpecDocumentWarning) -> Self {
        Self {
            document: warning.document,
            exception: warning.exception,
        }
    }
}

#[pymethods]
impl PySpecDocumentWarning {
    fn __str__(&self) -> String {
        format!("{}: {}", self.document, self.exception)
    }
}

#[pyclass(name = "MergedReport")]
#[derive(Debug, Clone)]
struct PyMergedReport {
    #[pyo3(get)]
    file_out: Option<String>,
    #[pyo3(get)]
    documents: Vec<String>,
    #[pyo3(get)]
    companies: Vec<String>,
    #[pyo3(get)]
    documents_empty: Vec<String>,
    #[pyo3(get)]
    warnings: Vec<PySpecDocumentWarning>,
    inner: MergedReport,
}

impl PyMergedReport {
    fn new(report: MergedReport, file_out: Option<String>) -> Self {
        Self {
            file_out,
            documents: report.documents.iter().map(|doc| doc.document.clone()).collect(),
            companies: report
                .documents
                .iter()
                .map(|doc| doc.meta.company.clone())
                .collect(),
            documents_empty: report.documents_empty.clone(),
            warnings: report
                .warnings
                .iter()
                .cloned()
                .map(PySpecDocumentWarning::from)
                .collect(),
            inner: report,
        }
    }
}

#[pymethods]
impl PyMergedReport {
    #[getter]
    fn document_count(&self) -> usize {
        self.inner.document_count()
    }

    #[getter]
    fn warning_count(&self) -> usize {
        self.inner.warning_count()
    }

    /// `(source, company, item_name, quantity, unit_price, line_total, note)`
    /// per ledger entry, in upload order.
    fn ledger_rows(&self) -> Vec<TypeLedgerRow> {
        self.inner
            .documents
            .iter()
            .flat_map(|doc| {
                doc.ledger.items.iter().map(move |item| {
                    (
                        doc.document.clone(),
                        doc.meta.company.clone(),
                        item.item_name.clone(),
                        item.quantity,
                        item.unit_price,
                        item.line_total,
                        item.note.clone(),
                    )
                })
            })
            .collect()
    }

    /// Company -> item -> summed quantity.
    fn pivot(&self) -> BTreeMap<String, BTreeMap<String, u64>> {
        let pivot = self.inner.derive_pivot();
        pivot
            .companies
            .iter()
            .zip(&pivot.quantities)
            .map(|(company, l_row)| {
                let dict_row: BTreeMap<String, u64> = pivot
                    .items
                    .iter()
                    .cloned()
                    .zip(l_row.iter().copied())
                    .collect();
                (company.clone(), dict_row)
            })
            .collect()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.inner.to_dict()
    }

    #[pyo3(signature = (prefix = "[MERGE]"))]
    fn format(&self, prefix: &str) -> String {
        self.inner.format(prefix)
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

#[derive(Debug)]
enum EnumBridgeFailure {
    Setup(String),
    Merge(OrderFormError),
    Write(String),
}

fn map_bridge_failure(failure: EnumBridgeFailure) -> PyErr {
    match failure {
        EnumBridgeFailure::Setup(message) => PyValueError::new_err(message),
        EnumBridgeFailure::Merge(err) => PyValueError::new_err(err.to_string()),
        EnumBridgeFailure::Write(message) => PyOSError::new_err(message),
    }
}

fn parse_profile(value: &str) -> PyResult<EnumTemplateProfile> {
    value.parse::<EnumTemplateProfile>().map_err(PyValueError::new_err)
}

fn run_merge(
    documents: Vec<SpecSourceDocument>,
    options: SpecMergeOptions,
    file_out: Option<&str>,
) -> Result<MergedReport, EnumBridgeFailure> {
    let mut merger =
        OrderFormMerger::with_defaults(options.clone()).map_err(EnumBridgeFailure::Setup)?;
    let report = merger
        .merge_all(&documents)
        .map_err(EnumBridgeFailure::Merge)?;

    if let Some(file_out) = file_out {
        let mut writer = XlsxWriter::new(file_out, SpecXlsxWriteOptions::default());
        report
            .export(&options, &mut writer)
            .map_err(EnumBridgeFailure::Write)?;
        writer.close().map_err(EnumBridgeFailure::Write)?;
    }
    Ok(report)
}

fn build_merge_options(
    profile: &str,
    if_include_zero_quantity: bool,
    if_build_pivot: bool,
    if_build_detail: bool,
    num_workers_max: Option<usize>,
    note_separator: &str,
) -> PyResult<SpecMergeOptions> {
    Ok(SpecMergeOptions {
        profile: parse_profile(profile)?,
        if_include_zero_quantity,
        if_build_pivot,
        if_build_detail,
        num_workers_max,
        note_separator: note_separator.to_string(),
    })
}

#[pyfunction(name = "merge_order_form_files")]
#[pyo3(signature = (
    paths,
    file_out = None,
    profile = "addenda_aware",
    if_include_zero_quantity = false,
    if_build_pivot = true,
    if_build_detail = false,
    num_workers_max = None,
    note_separator = ", "
))]
#[allow(clippy::too_many_arguments)]
fn merge_order_form_files_py(
    py: Python<'_>,
    paths: Vec<String>,
    file_out: Option<String>,
    profile: &str,
    if_include_zero_quantity: bool,
    if_build_pivot: bool,
    if_build_detail: bool,
    num_workers_max: Option<usize>,
    note_separator: &str,
) -> PyResult<PyMergedReport> {
    let options = build_merge_options(
        profile,
        if_include_zero_quantity,
        if_build_pivot,
        if_build_detail,
        num_workers_max,
        note_separator,
    )?;

    let report = py.allow_threads(|| {
        let l_documents = load_documents_from_paths(&paths);
        run_merge(l_documents, options, file_out.as_deref())
    });
    let report = report.map_err(map_bridge_failure)?;
    Ok(PyMergedReport::new(report, file_out))
}

#[pyfunction(name = "merge_order_forms")]
#[pyo3(signature = (
    uploads,
    file_out = None,
    profile = "addenda_aware",
    if_include_zero_quantity = false,
    if_build_pivot = true,
    if_build_detail = false,
    num_workers_max = None,
    note_separator = ", "
))]
#[allow(clippy::too_many_arguments)]
fn merge_order_forms_py(
    py: Python<'_>,
    uploads: Vec<(String, Vec<u8>)>,
    file_out: Option<String>,
    profile: &str,
    if_include_zero_quantity: bool,
    if_build_pivot: bool,
    if_build_detail: bool,
    num_workers_max: Option<usize>,
    note_separator: &str,
) -> PyResult<PyMergedReport> {
    let options = build_merge_options(
        profile,
        if_include_zero_quantity,
        if_build_pivot,
        if_build_detail,
        num_workers_max,
        note_separator,
    )?;

    let report = py.allow_threads(|| {
        let l_documents = load_documents_from_bytes(&uploads);
        run_merge(l_documents, options, file_out.as_deref())
    });
    let report = report.map_err(map_bridge_failure)?;
    Ok(PyMergedReport::new(report, file_out))
}

#[pymodule]
fn _boothkit_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySpecDocumentWarning>()?;
    module.add_class::<PyMergedReport>()?;
    module.add_function(wrap_pyfunction!(merge_order_form_files_py, module)?)?;
    module.add_function(wrap_pyfunction!(merge_order_forms_py, module)?)?;
    module.add(
        "TEMPLATE_PROFILES",
        EnumTemplateProfile::ALL.map(|profile| profile.as_str()).to_vec(),
    )?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
