use super::*;
use pretty_assertions::assert_eq;

const PE_OFFSET: usize = 0x80;
const SECTION_VA: u32 = 0x1000;
const SECTION_RAW: usize = 0x400;
const NAME_TABLE_RVA: u32 = SECTION_VA + 0x40;
const STRINGS_RVA: u32 = SECTION_VA + 0x80;

fn put_u16(image: &mut [u8], at: usize, value: u16) {
    image[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(image: &mut [u8], at: usize, value: u32) {
    image[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn file_offset(rva: u32) -> usize {
    (rva - SECTION_VA) as usize + SECTION_RAW
}

/// Minimal image: DOS header, PE header, one section holding the export
/// directory, the name-pointer table and the name strings.
fn image(machine: u16, export_rva: u32, names: &[&str]) -> Vec<u8> {
    let mut image = vec![0u8; 0x600];
    put_u16(&mut image, 0, 0x5A4D);
    put_u32(&mut image, 0x3C, PE_OFFSET as u32);

    image[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");
    put_u16(&mut image, PE_OFFSET + 4, machine);
    put_u16(&mut image, PE_OFFSET + 6, 1);

    let skip = if machine == 0x8664 { 128 } else { 112 };
    let export_dir_entry = PE_OFFSET + 8 + skip;
    put_u32(&mut image, export_dir_entry, export_rva);
    put_u32(&mut image, export_dir_entry + 4, 0x100);

    let section = export_dir_entry + 8 + 15 * 8;
    image[section..section + 8].copy_from_slice(b".edata\0\0");
    put_u32(&mut image, section + 8, 0x200);
    put_u32(&mut image, section + 12, SECTION_VA);
    put_u32(&mut image, section + 16, 0x200);
    put_u32(&mut image, section + 20, SECTION_RAW as u32);

    let dir = file_offset(SECTION_VA);
    put_u32(&mut image, dir + 24, names.len() as u32);
    put_u32(&mut image, dir + 32, NAME_TABLE_RVA);

    let mut string_rva = STRINGS_RVA;
    for (i, name) in names.iter().enumerate() {
        put_u32(&mut image, file_offset(NAME_TABLE_RVA) + 4 * i, string_rva);
        let at = file_offset(string_rva);
        image[at..at + name.len()].copy_from_slice(name.as_bytes());
        string_rva += name.len() as u32 + 1;
    }
    image
}

#[test]
fn reads_names_in_file_order_64_bit() {
    let data = image(0x8664, SECTION_VA, &["foo", "bar"]);
    assert_eq!(parse_exports(&data).ok(), Some(vec!["foo".to_owned(), "bar".to_owned()]));
}

#[test]
fn reads_names_32_bit() {
    let data = image(0x014C, SECTION_VA, &["avcodec_open2"]);
    assert_eq!(
        parse_exports(&data).ok(),
        Some(vec!["avcodec_open2".to_owned()])
    );
}

#[test]
fn zero_export_address_is_empty() {
    let data = image(0x8664, 0, &["ignored"]);
    assert_eq!(parse_exports(&data).ok(), Some(Vec::new()));
}

#[test]
fn empty_name_table() {
    let data = image(0x8664, SECTION_VA, &[]);
    assert_eq!(parse_exports(&data).ok(), Some(Vec::new()));
}

#[test]
fn non_image_is_rejected() {
    let data = b"#!/bin/sh\necho not a dll\n".to_vec();
    assert!(matches!(parse_exports(&data), Err(ImageError::BadDosMagic)));
}

#[test]
fn missing_pe_signature_is_rejected() {
    let mut data = image(0x8664, SECTION_VA, &["foo"]);
    data[PE_OFFSET] = b'X';
    assert!(matches!(
        parse_exports(&data),
        Err(ImageError::BadPeSignature { offset: PE_OFFSET })
    ));
}

#[test]
fn export_directory_outside_every_section() {
    let data = image(0x8664, 0x9000, &["foo"]);
    assert!(matches!(
        parse_exports(&data),
        Err(ImageError::UnmappedAddress { rva: 0x9000 })
    ));
}

#[test]
fn truncated_image() {
    let data = image(0x8664, SECTION_VA, &["foo"]);
    assert!(matches!(
        parse_exports(&data[..0x100]),
        Err(ImageError::Truncated { .. })
    ));
    assert!(matches!(
        parse_exports(&data[..1]),
        Err(ImageError::Truncated { offset: 0 })
    ));
}

#[test]
fn missing_file_reports_path() {
    let err = read_exports("/nonexistent/cbind/missing.dll");
    match err {
        Err(ImageError::Io { path, .. }) => {
            assert_eq!(path, std::path::PathBuf::from("/nonexistent/cbind/missing.dll"));
        }
        other => panic!("expected an I/O error, got {other:?}"),
    }
}
