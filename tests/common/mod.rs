//! Synthetic image builder shared by the integration tests and the benchmark.
//!
//! Produces a minimal PE container (one `.text` section) holding a CLI header, a metadata root,
//! the four heaps and a compressed table stream. Column widths are computed here from the row
//! counts and heap-size flags, independently of the reader's layout engine.

#![allow(dead_code)]

use metascope::{
    metadata::tables::{table_count, ColumnCategory, TableId, TableSchema},
    Token,
};

/// RVA of the single section
pub const SECTION_RVA: u32 = 0x2000;
/// File offset of the single section
pub const SECTION_OFFSET: usize = 0x200;
/// Size of the CLI header; the metadata root follows it directly
pub const COR20_SIZE: usize = 72;

/// Encode an unsigned value with the blob / user string length prefix
pub fn compress(value: u32) -> Vec<u8> {
    match value {
        0..=0x7F => vec![value as u8],
        0x80..=0x3FFF => vec![0x80 | (value >> 8) as u8, value as u8],
        _ => vec![
            0xC0 | (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ],
    }
}

fn pad4(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(0);
    }
}

/// Builder for synthetic managed images
pub struct ImageBuilder {
    strings: Vec<u8>,
    blob: Vec<u8>,
    guid: Vec<u8>,
    user_strings: Vec<u8>,
    rows: Vec<Vec<Vec<u32>>>,
    heap_sizes: u8,
    pe32_plus: bool,
    version: String,
    omitted: Vec<&'static str>,
    extra_streams: Vec<(String, Vec<u8>)>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        ImageBuilder {
            strings: vec![0],
            blob: vec![0],
            guid: Vec::new(),
            user_strings: vec![0],
            rows: vec![Vec::new(); table_count()],
            heap_sizes: 0,
            pe32_plus: false,
            version: "v4.0.30319".to_string(),
            omitted: Vec::new(),
            extra_streams: Vec::new(),
        }
    }

    pub fn pe32_plus(&mut self) -> &mut Self {
        self.pe32_plus = true;
        self
    }

    pub fn heap_sizes(&mut self, flags: u8) -> &mut Self {
        self.heap_sizes = flags;
        self
    }

    pub fn version(&mut self, version: &str) -> &mut Self {
        self.version = version.to_string();
        self
    }

    /// Leave a stream out of the directory
    pub fn omit_stream(&mut self, name: &'static str) -> &mut Self {
        self.omitted.push(name);
        self
    }

    /// Add a stream with arbitrary name and contents after the heaps
    pub fn extra_stream(&mut self, name: &str, data: &[u8]) -> &mut Self {
        self.extra_streams.push((name.to_string(), data.to_vec()));
        self
    }

    /// Replace the `#Blob` heap contents verbatim
    pub fn raw_blob_heap(&mut self, data: &[u8]) -> &mut Self {
        self.blob = data.to_vec();
        self
    }

    pub fn string(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }

        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        offset
    }

    pub fn blob(&mut self, data: &[u8]) -> u32 {
        if data.is_empty() {
            return 0;
        }

        let offset = self.blob.len() as u32;
        self.blob.extend(compress(data.len() as u32));
        self.blob.extend_from_slice(data);
        offset
    }

    /// Append a GUID and return its 1-based index
    pub fn guid(&mut self, value: [u8; 16]) -> u32 {
        self.guid.extend_from_slice(&value);
        (self.guid.len() / 16) as u32
    }

    pub fn user_string(&mut self, value: &str) -> u32 {
        let offset = self.user_strings.len() as u32;
        let units: Vec<u16> = value.encode_utf16().collect();
        let has_special = units.iter().any(|unit| *unit > 0x7E);

        self.user_strings.extend(compress(units.len() as u32 * 2 + 1));
        for unit in units {
            self.user_strings.extend_from_slice(&unit.to_le_bytes());
        }
        self.user_strings.push(u8::from(has_special));
        offset
    }

    /// Append a row; coded index columns take token values, all others raw values
    pub fn row(&mut self, table: TableId, values: &[u32]) -> u32 {
        let schema = TableSchema::of(table);
        assert_eq!(
            values.len(),
            schema.columns.len(),
            "wrong column count for {}",
            table.name()
        );

        let rows = &mut self.rows[table as usize];
        rows.push(values.to_vec());
        rows.len() as u32
    }

    /// Append `count` all-zero rows
    pub fn zero_rows(&mut self, table: TableId, count: u32) -> &mut Self {
        let columns = TableSchema::of(table).columns.len();
        let rows = &mut self.rows[table as usize];
        rows.extend(std::iter::repeat(vec![0; columns]).take(count as usize));
        self
    }

    pub fn module(&mut self, name: &str, mvid: [u8; 16]) -> u32 {
        let name = self.string(name);
        let mvid = self.guid(mvid);
        self.row(TableId::Module, &[0, name, mvid, 0, 0])
    }

    pub fn type_ref(&mut self, scope: Token, namespace: &str, name: &str) -> u32 {
        let name = self.string(name);
        let namespace = self.string(namespace);
        self.row(TableId::TypeRef, &[scope.value(), name, namespace])
    }

    pub fn type_def(
        &mut self,
        flags: u32,
        namespace: &str,
        name: &str,
        extends: Token,
        field_list: u32,
        method_list: u32,
    ) -> u32 {
        let name = self.string(name);
        let namespace = self.string(namespace);
        self.row(
            TableId::TypeDef,
            &[flags, name, namespace, extends.value(), field_list, method_list],
        )
    }

    pub fn field(&mut self, flags: u16, name: &str, signature: &[u8]) -> u32 {
        let name = self.string(name);
        let signature = self.blob(signature);
        self.row(TableId::Field, &[u32::from(flags), name, signature])
    }

    pub fn method_def(
        &mut self,
        rva: u32,
        flags: u16,
        name: &str,
        signature: &[u8],
        param_list: u32,
    ) -> u32 {
        let name = self.string(name);
        let signature = self.blob(signature);
        self.row(
            TableId::MethodDef,
            &[rva, 0, u32::from(flags), name, signature, param_list],
        )
    }

    pub fn param(&mut self, flags: u16, sequence: u16, name: &str) -> u32 {
        let name = self.string(name);
        self.row(
            TableId::Param,
            &[u32::from(flags), u32::from(sequence), name],
        )
    }

    pub fn constant(&mut self, element_type: u8, parent: Token, value: &[u8]) -> u32 {
        let value = self.blob(value);
        self.row(
            TableId::Constant,
            &[u32::from(element_type), 0, parent.value(), value],
        )
    }

    pub fn row_count(&self, table: TableId) -> u32 {
        self.rows[table as usize].len() as u32
    }

    /// Width of a column for the current row counts and heap-size flags
    pub fn column_width(&self, category: ColumnCategory) -> usize {
        match category {
            ColumnCategory::Scalar(width) => usize::from(width),
            ColumnCategory::Heap(heap) => {
                if self.heap_sizes & heap.size_flag() != 0 {
                    4
                } else {
                    2
                }
            }
            ColumnCategory::Row(target) => {
                if self.row_count(target) < 0x1_0000 {
                    2
                } else {
                    4
                }
            }
            ColumnCategory::Coded(kind) => {
                let tags = kind.tables().len() as u32;
                let tag_bits = 32 - (tags - 1).leading_zeros();
                let max_rows = kind
                    .tables()
                    .iter()
                    .flatten()
                    .map(|table| self.row_count(*table))
                    .max()
                    .unwrap_or(0);

                if max_rows < (1 << (16 - tag_bits)) {
                    2
                } else {
                    4
                }
            }
        }
    }

    /// Size of one row of `table` in the built image
    pub fn row_size(&self, table: TableId) -> usize {
        TableSchema::of(table)
            .columns
            .iter()
            .map(|column| self.column_width(column.category))
            .sum()
    }

    fn encode(&self, category: ColumnCategory, value: u32) -> u32 {
        match category {
            ColumnCategory::Coded(kind) if value != 0 => kind
                .encode(Token::new(value))
                .unwrap_or_else(|| panic!("token 0x{value:08x} is not a {}", kind.name())),
            _ => value,
        }
    }

    /// The compressed table stream
    pub fn tables_stream(&self) -> Vec<u8> {
        let mut valid = 0_u64;
        for index in 0..table_count() {
            if !self.rows[index].is_empty() {
                valid |= 1 << index;
            }
        }

        let mut data = Vec::new();
        data.extend_from_slice(&0_u32.to_le_bytes());
        data.push(2);
        data.push(0);
        data.push(self.heap_sizes);
        data.push(1);
        data.extend_from_slice(&valid.to_le_bytes());
        data.extend_from_slice(&0_u64.to_le_bytes());

        for rows in &self.rows {
            if !rows.is_empty() {
                data.extend_from_slice(&(rows.len() as u32).to_le_bytes());
            }
        }

        for (index, rows) in self.rows.iter().enumerate() {
            let table = TableId::from_u8(index as u8).unwrap();
            let schema = TableSchema::of(table);

            for row in rows {
                for (column, value) in schema.columns.iter().zip(row) {
                    let value = self.encode(column.category, *value);
                    match self.column_width(column.category) {
                        1 => data.push(value as u8),
                        2 => data.extend_from_slice(&(value as u16).to_le_bytes()),
                        _ => data.extend_from_slice(&value.to_le_bytes()),
                    }
                }
            }
        }

        pad4(&mut data);
        data
    }

    /// The metadata root, stream directory and stream contents
    pub fn metadata(&self) -> Vec<u8> {
        let mut streams: Vec<(String, Vec<u8>)> = vec![
            ("#Strings".to_string(), self.strings.clone()),
            ("#US".to_string(), self.user_strings.clone()),
            ("#GUID".to_string(), self.guid.clone()),
            ("#Blob".to_string(), self.blob.clone()),
        ];
        streams.extend(self.extra_streams.iter().cloned());
        streams.push(("#~".to_string(), self.tables_stream()));
        streams.retain(|(name, _)| !self.omitted.iter().any(|omitted| name.as_str() == *omitted));

        let mut version = self.version.as_bytes().to_vec();
        version.push(0);
        pad4(&mut version);

        let directory_size: usize = streams
            .iter()
            .map(|(name, _)| 8 + (name.len() + 1 + 3) / 4 * 4)
            .sum();

        let mut root = Vec::new();
        root.extend_from_slice(&0x424A_5342_u32.to_le_bytes());
        root.extend_from_slice(&1_u16.to_le_bytes());
        root.extend_from_slice(&1_u16.to_le_bytes());
        root.extend_from_slice(&0_u32.to_le_bytes());
        root.extend_from_slice(&(version.len() as u32).to_le_bytes());
        root.extend_from_slice(&version);
        root.extend_from_slice(&0_u16.to_le_bytes());
        root.extend_from_slice(&(streams.len() as u16).to_le_bytes());

        let mut offset = root.len() + directory_size;
        let mut contents = Vec::new();
        for (name, data) in &streams {
            let mut padded = data.clone();
            pad4(&mut padded);

            root.extend_from_slice(&(offset as u32).to_le_bytes());
            root.extend_from_slice(&(padded.len() as u32).to_le_bytes());
            root.extend_from_slice(name.as_bytes());
            root.push(0);
            pad4(&mut root);

            offset += padded.len();
            contents.extend(padded);
        }

        root.extend(contents);
        root
    }

    /// The complete PE image
    pub fn build(&self) -> Vec<u8> {
        let metadata = self.metadata();

        let mut section = Vec::new();
        section.extend_from_slice(&(COR20_SIZE as u32).to_le_bytes());
        section.extend_from_slice(&2_u16.to_le_bytes());
        section.extend_from_slice(&5_u16.to_le_bytes());
        section.extend_from_slice(&(SECTION_RVA + COR20_SIZE as u32).to_le_bytes());
        section.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        section.extend_from_slice(&1_u32.to_le_bytes());
        section.extend_from_slice(&0_u32.to_le_bytes());
        section.resize(COR20_SIZE, 0);
        section.extend(metadata);

        let optional_size: u16 = if self.pe32_plus { 240 } else { 224 };
        let (magic, rva_count_at, directories_at) = if self.pe32_plus {
            (0x20B_u16, 108, 112)
        } else {
            (0x10B_u16, 92, 96)
        };

        let mut image = vec![0_u8; SECTION_OFFSET];
        image[0..2].copy_from_slice(b"MZ");
        image[0x3C..0x40].copy_from_slice(&0x80_u32.to_le_bytes());
        image[0x80..0x84].copy_from_slice(b"PE\0\0");

        let coff = 0x84;
        image[coff..coff + 2].copy_from_slice(&0x14C_u16.to_le_bytes());
        image[coff + 2..coff + 4].copy_from_slice(&1_u16.to_le_bytes());
        image[coff + 16..coff + 18].copy_from_slice(&optional_size.to_le_bytes());

        let optional = coff + 20;
        image[optional..optional + 2].copy_from_slice(&magic.to_le_bytes());
        image[optional + rva_count_at..optional + rva_count_at + 4]
            .copy_from_slice(&16_u32.to_le_bytes());
        let clr = optional + directories_at + 14 * 8;
        image[clr..clr + 4].copy_from_slice(&SECTION_RVA.to_le_bytes());
        image[clr + 4..clr + 8].copy_from_slice(&(COR20_SIZE as u32).to_le_bytes());

        let header = optional + usize::from(optional_size);
        image[header..header + 8].copy_from_slice(b".text\0\0\0");
        image[header + 8..header + 12].copy_from_slice(&(section.len() as u32).to_le_bytes());
        image[header + 12..header + 16].copy_from_slice(&SECTION_RVA.to_le_bytes());
        image[header + 16..header + 20].copy_from_slice(&(section.len() as u32).to_le_bytes());
        image[header + 20..header + 24].copy_from_slice(&(SECTION_OFFSET as u32).to_le_bytes());

        image.extend(section);
        image
    }
}

/// Two real types after `<Module>` owning five methods as `MethodList = [1, 1, 4]`, with
/// fields, parameters and constants
///
/// | TypeDef | Name                 | FieldList | MethodList |
/// |---------|----------------------|-----------|------------|
/// | 1       | `<Module>`           | 1         | 1          |
/// | 2       | `Demo.Widget`        | 1         | 1          |
/// | 3       | `Demo.Gadget`        | 3         | 4          |
///
/// Fields: `Widget::Count` (I4 constant 42), `Widget::Label` (string constant "hi"),
/// `Gadget::Flag` (no constant). Methods 1..=3 belong to `Widget`, 4..=5 to `Gadget`.
/// `Widget::Resize` (method 2) owns params 1..=2; param 2 has a U2 constant of 7.
pub fn method_list_scenario() -> ImageBuilder {
    let mut builder = ImageBuilder::new();

    builder.module("Demo.dll", [0x11; 16]);
    let system = builder.row(TableId::AssemblyRef, &[4, 0, 0, 0, 0, 0, 0, 0, 0]);
    let object = builder.type_ref(
        Token::from_parts(TableId::AssemblyRef, system),
        "System",
        "Object",
    );
    let object = Token::from_parts(TableId::TypeRef, object);

    builder.type_def(0, "", "<Module>", Token::NULL, 1, 1);
    builder.type_def(0x0010_0001, "Demo", "Widget", object, 1, 1);
    builder.type_def(0x0010_0101, "Demo", "Gadget", object, 3, 4);

    let count = builder.field(0x8051, "Count", &[0x06, 0x08]);
    let label = builder.field(0x8051, "Label", &[0x06, 0x0E]);
    builder.field(0x0001, "Flag", &[0x06, 0x02]);

    builder.method_def(0x2050, 0x1886, ".ctor", &[0x20, 0x00, 0x01], 1);
    builder.method_def(0x2058, 0x0086, "Resize", &[0x20, 0x02, 0x01, 0x08, 0x07], 1);
    builder.method_def(0, 0x05C6, "Draw", &[0x20, 0x00, 0x01], 3);
    builder.method_def(0x2060, 0x0096, "Create", &[0x00, 0x00, 0x12], 3);
    builder.method_def(0x2068, 0x0086, "Toggle", &[0x20, 0x00, 0x01], 3);

    builder.param(0, 1, "width");
    let height = builder.param(0x1010, 2, "height");

    builder.constant(0x08, Token::from_parts(TableId::Field, count), &42_i32.to_le_bytes());
    builder.constant(0x0E, Token::from_parts(TableId::Field, label), &[b'h', 0, b'i', 0]);
    builder.constant(0x07, Token::from_parts(TableId::Param, height), &7_u16.to_le_bytes());

    builder
}
