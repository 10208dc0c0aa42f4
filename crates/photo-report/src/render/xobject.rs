//! JPEG image XObjects
//!
//! Compressed photos are embedded as-is with the DCTDecode filter; the PDF
//! stores the exact bytes that met the budget.

use crate::compress::CompressedImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Add a JPEG photo to `output` as an image XObject.
///
/// # Arguments
/// * `output` - The output document
/// * `image` - The compressed photo (baseline RGB JPEG)
pub fn create_jpeg_xobject(output: &mut Document, image: &CompressedImage) -> ObjectId {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(image.width as i64));
    dict.set("Height", Object::Integer(image.height as i64));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));

    // Already compressed; never re-encode with Flate
    let mut stream = Stream::new(dict, image.bytes.clone());
    stream.allows_compression = false;
    output.add_object(stream)
}
