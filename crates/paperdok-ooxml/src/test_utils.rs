//! Shared test fixtures for paperdok-ooxml

use std::io::{Cursor, Write};

use image::{ImageBuffer, ImageFormat, Rgb};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::OoxmlArchive;

/// `word/document.xml` of a rendered package
pub fn document_xml_of(docx: &[u8]) -> String {
    let archive = OoxmlArchive::from_bytes(docx).unwrap();
    String::from_utf8(archive.document_xml().unwrap().to_vec()).unwrap()
}

/// A solid-color PNG of the given size
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(width, height, Rgb([200, 60, 30]));
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}

/// A minimal DOCX whose body is `body_xml`, with one image part
/// `word/media/image1.png` behind `rId1`
pub fn docx_with_body(body_xml: &str, image: &[u8]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>{}</w:body>
</w:document>"#,
            body_xml
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("word/_rels/document.xml.rels", options)
        .unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#,
    )
    .unwrap();

    zip.start_file("word/media/image1.png", options).unwrap();
    zip.write_all(image).unwrap();

    zip.finish().unwrap();
    buffer.into_inner()
}

#[test]
fn test_docx_with_body_is_readable() {
    let docx = docx_with_body("<w:p><w:r><w:t>Hi</w:t></w:r></w:p>", &sample_png(4, 4));
    let content = crate::reader::DocxContent::from_bytes(&docx).unwrap();
    assert_eq!(content.flow.paragraphs().next().unwrap().text(), "Hi");
    assert!(content.image("rId1").unwrap().starts_with(b"\x89PNG"));
}
