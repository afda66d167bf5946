// Submodules for separation of concerns
mod compile;
mod eval;
mod field;
mod literal;
mod parse;
mod predicate;
mod types;

// Public API re-exports
pub use compile::Compiler;
pub use eval::{bson_equal, eval_predicate, eval_predicates, get_path, project_row};
pub use field::{check_path, qualify, render_path};
pub use literal::{is_scalar, render, render_set};
pub use parse::{parse_field_list, parse_filter_json};
pub use predicate::build as build_predicate;
pub use types::{Filter, Op, Predicate, Projection, QueryOptions, Statement, StatementKind};
