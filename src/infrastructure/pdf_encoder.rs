//! 单页 PDF 编码
//!
//! 把一张 JPEG 截图原样（DCTDecode）嵌入为 A4 页面的唯一内容，不重新压缩。

use crate::error::CaptureFailure;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Cursor;

/// A4 宽度（pt，210mm）
pub const A4_WIDTH_PT: f32 = 595.28;
/// A4 高度（pt，297mm）
pub const A4_HEIGHT_PT: f32 = 841.89;

/// 将 JPEG 截图封装为单页 A4 PDF
pub fn encode_single_page(jpeg: &[u8]) -> Result<Vec<u8>, CaptureFailure> {
    let (width, height) = image::io::Reader::new(Cursor::new(jpeg))
        .with_guessed_format()
        .map_err(|e| CaptureFailure::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| CaptureFailure::Decode(e.to_string()))?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg.to_vec(),
    )
    .with_compression(false);
    let image_id = doc.add_object(image_stream);

    // 图片拉伸铺满整页
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    A4_WIDTH_PT.into(),
                    0.into(),
                    0.into(),
                    A4_HEIGHT_PT.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| CaptureFailure::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            "Im0" => image_id,
        },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH_PT.into(), A4_HEIGHT_PT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| CaptureFailure::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::ColorType;

    fn tiny_jpeg(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![200u8; (width * height * 3) as usize];
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, 90)
            .encode(&pixels, width, height, ColorType::Rgb8)
            .unwrap();
        buf
    }

    #[test]
    fn test_encode_produces_single_a4_page() {
        let pdf = encode_single_page(&tiny_jpeg(16, 24)).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&pdf).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_image_embedded_with_pixel_size() {
        let jpeg = tiny_jpeg(16, 24);
        let pdf = encode_single_page(&jpeg).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();

        let image = doc
            .objects
            .values()
            .find_map(|obj| match obj {
                Object::Stream(stream)
                    if matches!(
                        stream.dict.get(b"Subtype").and_then(Object::as_name),
                        Ok(name) if name == b"Image"
                    ) =>
                {
                    Some(stream)
                }
                _ => None,
            })
            .expect("image stream");

        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 16);
        assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 24);
        assert_eq!(image.content, jpeg);
    }

    #[test]
    fn test_garbage_input_is_capture_failure() {
        let err = encode_single_page(b"definitely not a jpeg").unwrap_err();
        assert!(matches!(err, CaptureFailure::Decode(_)));
    }
}
