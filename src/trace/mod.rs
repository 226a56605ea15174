// Control-frame bookkeeping for structured control flow.
mod frame;
// The abstract interpreter and its driver.
mod tracer;
// Only contains StackReport, so re-export it in this module.
mod report;

pub use report::StackReport;
pub use tracer::{trace_stack_stats, FunctionStats};
