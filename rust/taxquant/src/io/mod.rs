//! Reading and writing the tab separated and JSON files of a run.

pub mod abundance_file;
pub mod lca_file;
pub mod peptide_file;
pub mod plot_json;

pub use abundance_file::write_abundance;
pub use lca_file::{
    LcaRow,
    LcaTable,
    LcaWriter,
};
pub use peptide_file::PeptideReader;
