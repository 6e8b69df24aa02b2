/// Identifier of the evaluated entity that owns many cases.
/// Examples: `augustine`, `hervormd`
pub type SubjectId = String;
/// Identifier of one case within a subject (may span several filename tokens).
/// Examples: `01`, `11jan2026_01`, `01_B`
pub type CaseId = String;
/// Raw domain name as it appears in a filename.
/// Examples: `aristoteles`, `schulz_von_thun`
pub type DomainName = String;
/// Namespaced output column name.
/// Examples: `dekker.overall.average_score`, `metadata.model`
pub type ColumnName = String;
/// Serialized scalar value placed in one table cell.
/// Examples: `7`, `TRUE`, `["a", "b"]`
pub type CellValue = String;
/// Domain-qualified metric name used by score statistics.
/// Examples: `aristoteles_Logos`, `dekker_#1 specific bible passage`
pub type MetricKey = String;
/// Grouping dimension used by score statistics (currently the subject).
/// Example: `augustine`
pub type CategoryId = String;
