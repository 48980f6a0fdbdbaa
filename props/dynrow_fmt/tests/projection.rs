//! End-to-end header/row projection across a class chain.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use chrono::NaiveDate;
use dynrow_eval::{ClassBuilder, PropClass, TypeTag, Value};
use dynrow_fmt::{as_mapping, head, row};
use pretty_assertions::assert_eq;

fn core() -> PropClass {
    ClassBuilder::root("Core")
        .global("update_date", TypeTag::DateTime)
        .global("download_date", TypeTag::DateTime)
        .global("import_date", TypeTag::DateTime)
        .global_with("sourcesystem", TypeTag::Str, "Unspecified")
        .build()
        .unwrap()
}

fn date(day: u32, h: u32, m: u32, s: u32) -> Value {
    let dt = NaiveDate::from_ymd_opt(2017, 5, day)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap();
    Value::datetime(dt)
}

#[test]
fn headers_follow_the_merged_key_order() {
    let core = core();
    assert_eq!(
        head(&core),
        "update_date\tdownload_date\timport_date\tsourcesystem"
    );

    let upload_first = ClassBuilder::extend(&core, "UploadFirst")
        .global("upload_id", TypeTag::Int)
        .parent_block()
        .build()
        .unwrap();
    assert_eq!(
        head(&upload_first),
        "upload_id\tupdate_date\tdownload_date\timport_date\tsourcesystem"
    );

    let no_marker = ClassBuilder::extend(&core, "NoMarker")
        .global("upload_id", TypeTag::Int)
        .build()
        .unwrap();
    assert_eq!(
        head(&no_marker),
        "update_date\tdownload_date\timport_date\tsourcesystem\tupload_id"
    );

    let dimension = ClassBuilder::extend(&no_marker, "Dimension")
        .local("concept", TypeTag::Str)
        .local_with("modifier", TypeTag::Str, "@")
        .parent_block()
        .build()
        .unwrap();
    assert_eq!(
        head(&dimension),
        "concept\tmodifier\tupdate_date\tdownload_date\timport_date\t\
         sourcesystem\tupload_id"
    );
}

#[test]
fn head_is_identical_for_class_and_instance() {
    let core = core();
    let inst = core.instance();
    assert_eq!(head(&core), head(inst.class()));
}

#[test]
fn rows_resolve_and_quote_strings_only() {
    let core = core();
    let upload_first = ClassBuilder::extend(&core, "UploadFirst")
        .global("upload_id", TypeTag::Int)
        .parent_block()
        .build()
        .unwrap();

    core.set("sourcesystem", "SSCODE").unwrap();
    core.set("import_date", date(31, 0, 0, 0)).unwrap();
    core.set("download_date", date(30, 11, 33, 20)).unwrap();
    core.set("update_date", date(29, 8, 33, 20)).unwrap();

    let x = core.instance();
    let y = upload_first.instance();
    assert_eq!(
        row(&x).unwrap(),
        "2017-05-29 08:33:20\t2017-05-30 11:33:20\t2017-05-31 00:00:00\t\"SSCODE\""
    );
    // The missing upload id renders as an empty leading field.
    assert_eq!(
        row(&y).unwrap(),
        "\t2017-05-29 08:33:20\t2017-05-30 11:33:20\t2017-05-31 00:00:00\t\"SSCODE\""
    );

    upload_first.set("upload_id", 12345_i64).unwrap();
    assert_eq!(
        row(&y).unwrap(),
        "12345\t2017-05-29 08:33:20\t2017-05-30 11:33:20\t2017-05-31 00:00:00\t\"SSCODE\""
    );
    // The parent's row is unaffected by the subclass's global.
    assert_eq!(
        row(&x).unwrap(),
        "2017-05-29 08:33:20\t2017-05-30 11:33:20\t2017-05-31 00:00:00\t\"SSCODE\""
    );

    core.clear();
    assert_eq!(row(&x).unwrap(), "\t\t\t\"Unspecified\"");
    assert_eq!(row(&y).unwrap(), "12345\t\t\t\t\"Unspecified\"");
}

#[test]
fn separator_changes_follow_the_configuration_slot() {
    let core = core();
    let sub = ClassBuilder::extend(&core, "Sub")
        .local_with("tag", TypeTag::Str, "@")
        .parent_block()
        .build()
        .unwrap();

    core.set_separator('A');
    assert_eq!(
        head(&core),
        "update_dateAdownload_dateAimport_dateAsourcesystem"
    );
    // The subclass shares the parent's slot until it pins its own.
    assert_eq!(
        head(&sub),
        "tagAupdate_dateAdownload_dateAimport_dateAsourcesystem"
    );

    sub.set_separator('B');
    assert_eq!(
        head(&sub),
        "tagBupdate_dateBdownload_dateBimport_dateBsourcesystem"
    );
    // The parent keeps its own separator.
    assert_eq!(
        head(&core),
        "update_dateAdownload_dateAimport_dateAsourcesystem"
    );
}

#[test]
fn escape_pair_is_configurable() {
    let core = core();
    core.set("sourcesystem", "ABC\"DEF").unwrap();

    let inst = core.instance();
    assert!(row(&inst).unwrap().ends_with("\"ABC\\\"DEF\""));

    // Doubled-quote escaping, returning the previous substitution.
    let previous = core.set_escape("\"\"");
    assert_eq!(previous, "\\\"");
    assert!(row(&inst).unwrap().ends_with("\"ABC\"\"DEF\""));
    assert_eq!(core.escape(), "\"\"");
}

#[test]
fn mapping_keys_match_header_fields() {
    let core = core();
    let dimension = ClassBuilder::extend(&core, "Dimension")
        .local("concept", TypeTag::Str)
        .local_with("modifier", TypeTag::Str, "@")
        .parent_block()
        .build()
        .unwrap();

    let inst = dimension.instance();
    inst.set("concept", "LOINC:11971").unwrap();

    let mapping = as_mapping(&inst).unwrap();
    let header = head(&dimension);
    let separator = dimension.row_config().separator;
    assert_eq!(
        mapping.keys().collect::<Vec<_>>(),
        header.split(separator).collect::<Vec<_>>()
    );
    assert_eq!(
        mapping.get("concept").unwrap(),
        &Value::string("LOINC:11971")
    );
    assert_eq!(mapping.get("modifier").unwrap(), &Value::string("@"));
}

#[test]
fn core_ext_scenario() {
    let core = ClassBuilder::root("Core2")
        .global_with("code", TypeTag::Str, "Unspecified")
        .build()
        .unwrap();
    let ext = ClassBuilder::extend(&core, "Ext")
        .local_with("tag", TypeTag::Str, "@")
        .parent_block()
        .build()
        .unwrap();

    assert_eq!(head(&ext), "tag\tcode");
    assert_eq!(row(&ext.instance()).unwrap(), "\"@\"\t\"Unspecified\"");

    core.set("code", "X").unwrap();
    assert_eq!(ext.instance().get("code").unwrap(), Value::string("X"));
    assert_eq!(row(&ext.instance()).unwrap(), "\"@\"\t\"X\"");
}
