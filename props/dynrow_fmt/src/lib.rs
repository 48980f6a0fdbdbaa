//! dynrow fmt - delimited projection of classes and instances.
//!
//! The consumer-facing surface of the model: [`head`] renders a class's
//! field names, [`row`] resolves an instance in serialization order and
//! renders one delimited row, [`as_mapping`] hands back the ordered
//! snapshot itself. All three follow the effective [`RowConfig`] of the
//! class chain, so `head` and `row` always agree on separator, field count
//! and order.
//!
//! [`RowConfig`]: dynrow_ir::RowConfig

mod writer;

pub use writer::RowWriter;

use dynrow_eval::{Frozen, Instance, PropClass};
use dynrow_ir::PropResult;

/// Header of `class`: field names joined in serialization order.
///
/// Identical for the class and for any of its instances.
pub fn head(class: &PropClass) -> String {
    RowWriter::new(class.row_config()).write_header(class.keys())
}

/// One delimited row for `instance`, resolved in serialization order.
pub fn row(instance: &Instance) -> PropResult<String> {
    let writer = RowWriter::new(instance.class().row_config());
    let frozen = instance.freeze()?;
    Ok(writer.write_row(frozen.values()))
}

/// Ordered name→value snapshot of `instance`.
pub fn as_mapping(instance: &Instance) -> PropResult<Frozen> {
    instance.freeze()
}
