//! Column widths at the heap-size, row-reference and coded-index boundaries.

mod common;

use common::ImageBuilder;
use metascope::prelude::*;

#[test]
fn wide_string_heap() {
    let mut builder = ImageBuilder::new();
    builder.heap_sizes(0x01);
    builder.string(&"x".repeat(0x1_0000));
    builder.type_def(0, "", "<Module>", Token::NULL, 1, 1);
    builder.type_def(0x0010_0001, "Far.Away", "Target", Token::NULL, 1, 1);

    let data = builder.build();
    let image = MetadataImage::open(&data).unwrap();

    assert_eq!(image.column_info(TableId::TypeDef, 1).unwrap().width, 4);
    assert_eq!(image.column_info(TableId::TypeDef, 2).unwrap().width, 4);
    assert_eq!(image.table_info(TableId::TypeDef).row_size, 4 + 4 + 4 + 2 + 2 + 2);

    let name = image.read_column(TableId::TypeDef, 1, 2).unwrap();
    assert!(name > 0xFFFF);
    assert_eq!(image.string_at(name).unwrap(), "Target");

    let target = image.find_type_by_full_name("Far.Away.Target").unwrap();
    assert_eq!(target, Some(Token::from_parts(TableId::TypeDef, 2)));
    assert_eq!(image.type_name(target.unwrap()).unwrap(), "Far.Away.Target");
}

#[test]
fn wide_blob_heap() {
    let mut builder = ImageBuilder::new();
    builder.heap_sizes(0x04);
    builder.blob(&vec![0xAB; 0x1_0000]);
    builder.type_def(0, "", "<Module>", Token::NULL, 1, 1);
    builder.method_def(0x2050, 0x0016, "Run", &[0x00, 0x00, 0x01], 1);

    let data = builder.build();
    let image = MetadataImage::open(&data).unwrap();

    assert_eq!(image.column_info(TableId::MethodDef, 4).unwrap().width, 4);
    assert_eq!(image.column_info(TableId::MethodDef, 3).unwrap().width, 2);

    let signature = image.read_column(TableId::MethodDef, 4, 1).unwrap();
    assert!(signature > 0xFFFF);

    let props = image.method_def_props(Token::from_parts(TableId::MethodDef, 1)).unwrap();
    assert_eq!(props.name, "Run");
    assert_eq!(props.signature, &[0x00, 0x00, 0x01]);
    assert_eq!(image.blob_at(1).unwrap().len(), 0x1_0000);
}

#[test]
fn wide_guid_heap() {
    let mut builder = ImageBuilder::new();
    builder.heap_sizes(0x02);
    builder.module("Wide.dll", [0x42; 16]);

    let data = builder.build();
    let image = MetadataImage::open(&data).unwrap();

    let mvid = image.column_info(TableId::Module, 2).unwrap();
    assert_eq!(mvid.width, 4);
    assert_eq!(mvid.offset, 4);
    assert_eq!(image.column_info(TableId::Module, 1).unwrap().width, 2);
    assert_eq!(image.table_info(TableId::Module).row_size, 2 + 2 + 4 + 4 + 4);

    let index = image.read_column(TableId::Module, 2, 1).unwrap();
    assert_eq!(image.guid_at(index).unwrap(), &[0x42; 16]);
}

fn constant_parent_width(field_rows: u32) -> (usize, ConstantValue) {
    let mut builder = ImageBuilder::new();
    builder.zero_rows(TableId::Field, field_rows);
    builder.constant(
        0x08,
        Token::from_parts(TableId::Field, field_rows),
        &(-5_i32).to_le_bytes(),
    );

    let data = builder.build();
    let image = MetadataImage::open(&data).unwrap();

    let width = image.column_info(TableId::Constant, 2).unwrap().width;
    let value = image
        .constant_of(Token::from_parts(TableId::Field, field_rows))
        .unwrap();
    (width, value)
}

#[test]
fn coded_index_boundary() {
    // HasConstant has three candidates and 2 tag bits: 2 bytes hold up to 2^14 - 1 rows
    assert_eq!(constant_parent_width(16383), (2, ConstantValue::I4(-5)));
    assert_eq!(constant_parent_width(16384), (4, ConstantValue::I4(-5)));
}

#[test]
fn row_reference_boundary() {
    for (field_rows, width) in [(0xFFFF_u32, 2_usize), (0x1_0000, 4)] {
        let mut builder = ImageBuilder::new();
        builder.zero_rows(TableId::Field, field_rows);
        builder.type_def(0, "", "<Module>", Token::NULL, 1, 1);
        builder.type_def(0x0010_0001, "Big", "Holder", Token::NULL, field_rows, 1);

        let data = builder.build();
        let image = MetadataImage::open(&data).unwrap();

        assert_eq!(image.column_info(TableId::TypeDef, 4).unwrap().width, width);
        assert_eq!(image.column_info(TableId::TypeDef, 5).unwrap().width, 2);

        let holder = Token::from_parts(TableId::TypeDef, 2);
        let fields: Vec<Token> = image.enum_fields_of(holder).unwrap().collect();
        assert_eq!(fields, vec![Token::from_parts(TableId::Field, field_rows)]);

        let module = Token::from_parts(TableId::TypeDef, 1);
        assert_eq!(
            image.enum_fields_of(module).unwrap().total_count(),
            field_rows - 1
        );
    }
}

#[test]
fn row_access_errors() {
    let mut builder = ImageBuilder::new();
    builder.type_def(0, "", "<Module>", Token::NULL, 1, 1);
    let data = builder.build();
    let image = MetadataImage::open(&data).unwrap();

    assert_eq!(image.row_bytes(TableId::TypeDef, 1).unwrap().len(), 14);
    assert!(matches!(
        image.row_bytes(TableId::TypeDef, 0),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(matches!(
        image.row_bytes(TableId::TypeDef, 2),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(matches!(
        image.read_column(TableId::TypeDef, 0, 2),
        Err(Error::OutOfBounds { .. })
    ));
    assert!(matches!(
        image.read_column(TableId::TypeDef, 9, 1),
        Err(Error::UnknownColumn { .. })
    ));
    assert!(matches!(
        image.read_column(TableId::MethodDef, 0, 1),
        Err(Error::OutOfBounds { .. })
    ));
}

#[test]
fn nil_coded_index_keeps_table() {
    let mut builder = ImageBuilder::new();
    builder.type_def(0, "", "<Module>", Token::NULL, 1, 1);
    let data = builder.build();
    let image = MetadataImage::open(&data).unwrap();

    // a stored 0 decodes to tag 0 of TypeDefOrRef, the TypeDef table
    let extends = Token::new(image.read_column(TableId::TypeDef, 3, 1).unwrap());
    assert_eq!(extends.table_id(), Some(TableId::TypeDef));
    assert!(extends.is_null());

    let props = image.type_def_props(Token::from_parts(TableId::TypeDef, 1)).unwrap();
    assert_eq!(props.base_type, Token::NULL);
    assert_eq!(props.full_name(), "<Module>");
}
