#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::Array2;
use stonesteps_core::frame::{Frame, SampleFormat};
use stonesteps_core::header::{Header, HeaderValue};
use stonesteps_core::io::fits::write_fits;

/// Build a header from `(keyword, value)` pairs.
pub fn header_with(cards: &[(&str, HeaderValue)]) -> Header {
    let mut header = Header::new();
    for (key, value) in cards {
        header.set(key, value.clone());
    }
    header
}

/// A frame with a uniform value and the given header cards.
pub fn uniform_frame(h: usize, w: usize, value: f32, cards: &[(&str, HeaderValue)]) -> Frame {
    Frame::new(Array2::from_elem((h, w), value), header_with(cards))
}

/// A frame with explicit pixel rows.
pub fn frame_from_rows(rows: &[&[f32]], cards: &[(&str, HeaderValue)]) -> Frame {
    let h = rows.len();
    let w = rows.first().map_or(0, |r| r.len());
    let pixels: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    let data = Array2::from_shape_vec((h, w), pixels).expect("rectangular rows");
    Frame::new(data, header_with(cards))
}

/// Write `frame` as float FITS to `dir/name` and return the path.
pub fn write_test_fits(dir: &Path, name: &str, frame: &Frame) -> PathBuf {
    let path = dir.join(name);
    write_fits(frame, &path, SampleFormat::F32).expect("write test FITS");
    path
}

/// Build a raw FITS header from pre-formatted cards, padded to one block.
pub fn raw_header(cards: &[&str]) -> Vec<u8> {
    let mut buf = Vec::new();
    for card in cards {
        buf.extend_from_slice(format!("{card:<80}").as_bytes());
    }
    let padded = buf.len().div_ceil(2880) * 2880;
    buf.resize(padded, b' ');
    buf
}

pub fn text(s: &str) -> HeaderValue {
    HeaderValue::Text(s.to_string())
}

pub fn real(v: f64) -> HeaderValue {
    HeaderValue::Real(v)
}

pub fn int(v: i64) -> HeaderValue {
    HeaderValue::Integer(v)
}
