use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;

use fitsio::errors::check_status;
use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::images::{ImageDescription, ImageType};
use fitsio::{sys, FitsFile};
use ndarray::{Array2, Array3};
use num_traits::{NumCast, Zero};
use tracing::debug;

use crate::error::{Result, StoneStepsError};
use crate::frame::{Frame, SampleFormat};
use crate::header::{is_structural, Card, Header, HeaderValue};

/// cfitsio buffer length for a whole card (80 characters plus NUL).
const FLEN_CARD: usize = 81;

/// Longest string value that fits between the quotes of one card.
const MAX_STRING_VALUE: usize = 68;

/// Longest keyword without the HIERARCH convention.
const MAX_KEYWORD_LEN: usize = 8;

/// COMMENT lines cfitsio adds to every primary header it creates.
const CFITSIO_BOILERPLATE: &[&str] = &[
    "FITS (Flexible Image Transport System) format is defined in 'Astronomy",
    "and Astrophysics', volume 376, page 359; bibcode: 2001A&A...376..359H",
];

/// Read the primary HDU of a FITS file into a [`Frame`].
///
/// Samples are read as `f32` with BSCALE/BZERO applied by cfitsio. The image
/// must be two-dimensional (a third axis of length 1 is accepted).
pub fn read_fits(path: &Path) -> Result<Frame> {
    // surface a missing file as an I/O error rather than a cfitsio status
    std::fs::metadata(path)?;

    let mut fptr = FitsFile::open(path).map_err(|e| invalid(path, e))?;
    let hdu = fptr.primary_hdu().map_err(|e| invalid(path, e))?;

    let (height, width) = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => match shape.as_slice() {
            [h, w] | [1, h, w] => (*h, *w),
            [] => return Err(invalid(path, "primary HDU has no data array")),
            axes => {
                return Err(invalid(
                    path,
                    format!("expected a 2-D image, found NAXIS = {}", axes.len()),
                ))
            }
        },
        HduInfo::TableInfo { .. } => return Err(invalid(path, "primary HDU is a table")),
        HduInfo::AnyInfo => return Err(invalid(path, "unknown primary HDU type")),
    };
    let pixel_count = height
        .checked_mul(width)
        .ok_or_else(|| invalid(path, format!("image size {width}x{height} overflows")))?;

    let source_format = stored_format(&hdu, &mut fptr);
    let header = read_header_records(&hdu, &mut fptr).map_err(|e| invalid(path, e))?;

    let pixels: Vec<f32> = hdu.read_image(&mut fptr).map_err(|e| invalid(path, e))?;
    if pixels.len() != pixel_count {
        return Err(invalid(
            path,
            format!("expected {pixel_count} samples, read {}", pixels.len()),
        ));
    }
    let data = Array2::from_shape_vec((height, width), pixels)
        .map_err(|e| invalid(path, e.to_string()))?;

    debug!(
        "Read {} ({}x{}, {})",
        path.display(),
        width,
        height,
        source_format
    );

    Ok(Frame {
        data,
        header,
        path: path.to_path_buf(),
        source_format,
    })
}

/// Read only the primary header, without decoding pixels.
pub fn read_fits_header(path: &Path) -> Result<Header> {
    std::fs::metadata(path)?;
    let mut fptr = FitsFile::open(path).map_err(|e| invalid(path, e))?;
    let hdu = fptr.primary_hdu().map_err(|e| invalid(path, e))?;
    read_header_records(&hdu, &mut fptr).map_err(|e| invalid(path, e))
}

/// Load several frames in order.
pub fn load_frames<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Frame>> {
    paths.iter().map(|p| read_fits(p.as_ref())).collect()
}

/// Write a frame as a single-HDU FITS file in the requested sample format,
/// replacing any existing file.
///
/// Integer formats round to nearest and clamp to the representable range;
/// non-finite pixels become 0.
pub fn write_fits(frame: &Frame, path: &Path, format: SampleFormat) -> Result<()> {
    let (h, w) = frame.dim();
    let (mut fptr, hdu) = create_primary(path, image_type(format), &[h, w])?;
    write_header_records(&hdu, &mut fptr, &frame.header)?;

    let samples = frame.data.iter().copied();
    match format {
        SampleFormat::U8 => hdu.write_image(&mut fptr, &stored_samples::<u8>(samples, format))?,
        SampleFormat::I16 => hdu.write_image(&mut fptr, &stored_samples::<i16>(samples, format))?,
        SampleFormat::U16 => hdu.write_image(&mut fptr, &stored_samples::<u16>(samples, format))?,
        SampleFormat::I32 => hdu.write_image(&mut fptr, &stored_samples::<i32>(samples, format))?,
        SampleFormat::F32 => hdu.write_image(&mut fptr, &samples.collect::<Vec<f32>>())?,
        SampleFormat::F64 => {
            hdu.write_image(&mut fptr, &samples.map(|v| v as f64).collect::<Vec<f64>>())?
        }
    };

    debug!("Wrote {} ({}x{}, {})", path.display(), w, h, format);
    Ok(())
}

/// Write a `(height, width, planes)` float cube as NAXIS = 3, plane-major.
pub fn write_fits_cube(cube: &Array3<f32>, header: &Header, path: &Path) -> Result<()> {
    let (h, w, planes) = cube.dim();
    let (mut fptr, hdu) = create_primary(path, ImageType::Float, &[planes, h, w])?;
    write_header_records(&hdu, &mut fptr, header)?;

    let mut plane_major = cube.view();
    plane_major.swap_axes(0, 2);
    plane_major.swap_axes(1, 2);
    let samples: Vec<f32> = plane_major.iter().copied().collect();
    hdu.write_image(&mut fptr, &samples)?;

    debug!("Wrote cube {} ({}x{}x{})", path.display(), w, h, planes);
    Ok(())
}

fn invalid(path: &Path, reason: impl ToString) -> StoneStepsError {
    StoneStepsError::InvalidFits {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// `dimensions` are in row-major order, slowest axis first.
fn create_primary(
    path: &Path,
    data_type: ImageType,
    dimensions: &[usize],
) -> Result<(FitsFile, FitsHdu)> {
    let description = ImageDescription {
        data_type,
        dimensions,
    };
    let mut fptr = FitsFile::create(path)
        .with_custom_primary(&description)
        .overwrite()
        .open()?;
    let hdu = fptr.primary_hdu()?;
    Ok((fptr, hdu))
}

fn image_type(format: SampleFormat) -> ImageType {
    match format {
        SampleFormat::U8 => ImageType::UnsignedByte,
        SampleFormat::I16 => ImageType::Short,
        SampleFormat::U16 => ImageType::UnsignedShort,
        SampleFormat::I32 => ImageType::Long,
        SampleFormat::F32 => ImageType::Float,
        SampleFormat::F64 => ImageType::Double,
    }
}

/// Storage format from BITPIX plus the unsigned-16 BZERO convention.
fn stored_format(hdu: &FitsHdu, fptr: &mut FitsFile) -> SampleFormat {
    let bitpix = hdu.read_key::<i64>(fptr, "BITPIX").unwrap_or(-32);
    let bscale = hdu.read_key::<f64>(fptr, "BSCALE").unwrap_or(1.0);
    let bzero = hdu.read_key::<f64>(fptr, "BZERO").unwrap_or(0.0);
    match bitpix {
        8 => SampleFormat::U8,
        16 if SampleFormat::U16.bzero() == Some(bzero) && bscale == 1.0 => SampleFormat::U16,
        16 => SampleFormat::I16,
        32 => SampleFormat::I32,
        -64 => SampleFormat::F64,
        _ => SampleFormat::F32,
    }
}

fn stored_samples<T>(samples: impl Iterator<Item = f32>, format: SampleFormat) -> Vec<T>
where
    T: NumCast + Zero,
{
    let (lo, hi) = format.value_range();
    samples.map(|v| round_clamped(v, lo, hi)).collect()
}

/// Round a physical value to nearest and clamp it into `[lo, hi]`.
fn round_clamped<T: NumCast + Zero>(v: f32, lo: f64, hi: f64) -> T {
    if !v.is_finite() {
        return T::zero();
    }
    num_traits::cast((v as f64).round().clamp(lo, hi)).unwrap_or_else(T::zero)
}

/// One header record as enumerated by cfitsio.
struct RawRecord {
    keyword: String,
    value: String,
    comment: String,
    /// cfitsio value class: `C`, `L`, `I`, `F` or `X`; `None` when undefined.
    class: Option<u8>,
}

fn header_records(fptr: &mut FitsFile) -> fitsio::errors::Result<Vec<RawRecord>> {
    let mut status: c_int = 0;
    let mut count: c_int = 0;
    let mut more: c_int = 0;
    unsafe {
        sys::ffghsp(fptr.as_raw(), &mut count, &mut more, &mut status);
    }
    check_status(status)?;

    let mut records = Vec::with_capacity(count.max(0) as usize);
    for n in 1..=count {
        let mut keyword = [0 as c_char; FLEN_CARD];
        let mut value = [0 as c_char; FLEN_CARD];
        let mut comment = [0 as c_char; FLEN_CARD];
        unsafe {
            sys::ffgkyn(
                fptr.as_raw(),
                n,
                keyword.as_mut_ptr(),
                value.as_mut_ptr(),
                comment.as_mut_ptr(),
                &mut status,
            );
        }
        check_status(status)?;

        let value_text = c_text(&value);
        let class = if value_text.is_empty() {
            None
        } else {
            let mut class: c_char = 0;
            let mut class_status: c_int = 0;
            unsafe {
                sys::ffdtyp(value.as_ptr(), &mut class, &mut class_status);
            }
            (class_status == 0).then_some(class as u8)
        };

        records.push(RawRecord {
            keyword: c_text(&keyword),
            value: value_text,
            comment: c_text(&comment),
            class,
        });
    }
    Ok(records)
}

fn c_text(buf: &[c_char]) -> String {
    // ffgkyn always NUL-terminates within FLEN_CARD
    let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
    text.to_string_lossy().trim().to_string()
}

fn read_header_records(hdu: &FitsHdu, fptr: &mut FitsFile) -> fitsio::errors::Result<Header> {
    let mut header = Header::new();

    for record in header_records(fptr)? {
        let keyword = record.keyword.as_str();
        match keyword {
            "" | "END" | "CONTINUE" => continue,
            "HISTORY" => {
                header.push_history(record.comment);
                continue;
            }
            "COMMENT" => {
                if !CFITSIO_BOILERPLATE.contains(&record.comment.as_str()) {
                    header.push_comment(record.comment);
                }
                continue;
            }
            k if is_structural(k) || k.starts_with("NAXIS") => continue,
            _ => {}
        }

        let value = match record.class {
            Some(b'C') => HeaderValue::Text(hdu.read_key::<String>(fptr, keyword)?),
            Some(b'L') => HeaderValue::Logical(record.value == "T"),
            Some(b'I') => match hdu.read_key::<i64>(fptr, keyword) {
                Ok(i) => HeaderValue::Integer(i),
                Err(_) => HeaderValue::Real(hdu.read_key::<f64>(fptr, keyword)?),
            },
            Some(b'F') => HeaderValue::Real(hdu.read_key::<f64>(fptr, keyword)?),
            _ => HeaderValue::Text(record.value.clone()),
        };
        let comment = (!record.comment.is_empty()).then_some(record.comment);
        header.set_with_comment(keyword, value, comment);
    }
    Ok(header)
}

fn write_header_records(hdu: &FitsHdu, fptr: &mut FitsFile, header: &Header) -> Result<()> {
    for Card {
        keyword,
        value,
        comment,
    } in header.cards()
    {
        if is_structural(keyword) {
            continue;
        }
        if keyword.len() > MAX_KEYWORD_LEN || !keyword.is_ascii() {
            return Err(StoneStepsError::InvalidInput(format!(
                "header keyword '{keyword}' is longer than {MAX_KEYWORD_LEN} ASCII characters"
            )));
        }

        let comment = comment.as_deref().map(printable).unwrap_or_default();
        match value {
            HeaderValue::Logical(b) => write_logical(fptr, keyword, *b, &comment)?,
            HeaderValue::Integer(i) => hdu.write_key(fptr, keyword, (*i, comment.as_str()))?,
            HeaderValue::Real(r) if r.is_finite() => {
                hdu.write_key(fptr, keyword, (*r, comment.as_str()))?
            }
            HeaderValue::Real(r) => {
                hdu.write_key(fptr, keyword, (r.to_string().as_str(), comment.as_str()))?
            }
            HeaderValue::Text(s) => {
                hdu.write_key(fptr, keyword, (fit_string_value(s).as_str(), comment.as_str()))?
            }
        }
    }

    for line in header.comments() {
        write_commentary(fptr, Commentary::Comment, line)?;
    }
    for line in header.history() {
        write_commentary(fptr, Commentary::History, line)?;
    }
    Ok(())
}

/// Printable ASCII only; cfitsio rejects anything else in a card.
fn printable(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Shorten a string so its quoted form (with `'` doubled) fits one card.
/// Never cuts between the two halves of a doubled quote.
fn fit_string_value(text: &str) -> String {
    let mut used = 0;
    printable(text)
        .chars()
        .take_while(|&c| {
            used += if c == '\'' { 2 } else { 1 };
            used <= MAX_STRING_VALUE
        })
        .collect()
}

fn write_logical(fptr: &mut FitsFile, keyword: &str, value: bool, comment: &str) -> Result<()> {
    let keyword = c_string(keyword);
    let comment = c_string(comment);
    let mut status: c_int = 0;
    unsafe {
        sys::ffpkyl(
            fptr.as_raw(),
            keyword.as_ptr(),
            <c_int as From<bool>>::from(value),
            comment.as_ptr(),
            &mut status,
        );
    }
    check_status(status)?;
    Ok(())
}

#[derive(Clone, Copy)]
enum Commentary {
    Comment,
    History,
}

/// cfitsio continues text longer than one card over several records.
fn write_commentary(fptr: &mut FitsFile, kind: Commentary, text: &str) -> Result<()> {
    let text = c_string(text);
    let mut status: c_int = 0;
    unsafe {
        match kind {
            Commentary::Comment => sys::ffpcom(fptr.as_raw(), text.as_ptr(), &mut status),
            Commentary::History => sys::ffphis(fptr.as_raw(), text.as_ptr(), &mut status),
        };
    }
    check_status(status)?;
    Ok(())
}

fn c_string(text: &str) -> CString {
    // printable() strips NUL, so this cannot fail
    CString::new(printable(text)).unwrap_or_default()
}
