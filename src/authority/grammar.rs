//!
//! Authority code grammar (spec section 4.H / 6): parses the handful of
//! textual forms a caller may hand the registry into a small internal AST,
//! before any lookup happens. Kept separate from `fallback.rs` so the
//! string-wrangling (which has nothing to do with geodesy) doesn't clutter
//! the table that does.
//!

use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Code {
    Simple { authority: String, code: String },
    Composite(Vec<Code>),
    Auto {
        method: u32,
        unit_code: Option<u32>,
        lon: f64,
        lat: f64,
    },
}

/// Case-insensitive prefix strip.
fn strip_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes()) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

pub(crate) fn parse(input: &str) -> Result<Code> {
    let s = input.trim();

    if let Some(rest) = strip_ci(s, "urn:ogc:def:crs,") {
        return parse_composite(input, rest);
    }

    if let Some(rest) = strip_ci(s, "auto2:").or_else(|| strip_ci(s, "auto:")) {
        return parse_auto(input, rest);
    }

    if let Some(rest) = strip_ci(s, "http://www.opengis.net/def/") {
        return parse_http(input, rest);
    }

    if let Some(rest) = strip_ci(s, "urn:ogc:def:") {
        return parse_urn(input, rest);
    }

    parse_simple(input, s)
}

/// `urn:ogc:def:crs,crs:A::X,crs:B::Y` (the `urn:ogc:def:crs,` prefix
/// already stripped): split on `,`, each piece is itself a `crs:`-prefixed
/// sub-code to fold down to [`parse_simple`]'s empty-version form.
fn parse_composite(original: &str, rest: &str) -> Result<Code> {
    let mut parts = Vec::new();
    for piece in rest.split(',') {
        let piece = strip_ci(piece, "crs:").unwrap_or(piece);
        parts.push(parse_simple(original, piece.trim())?);
    }
    if parts.len() < 2 {
        return Err(Error::UnrecognizedFormat(original.to_string()));
    }
    Ok(Code::Composite(parts))
}

/// `CODE,[unit,]lon,lat` (the `AUTO:`/`AUTO2:` prefix already stripped).
fn parse_auto(original: &str, rest: &str) -> Result<Code> {
    let fields: Vec<&str> = rest.split(',').map(str::trim).collect();
    if fields.is_empty() {
        return Err(Error::UnrecognizedFormat(original.to_string()));
    }
    let method: u32 = fields[0]
        .parse()
        .map_err(|_| Error::UnrecognizedFormat(original.to_string()))?;
    let params = &fields[1..];
    let (unit_code, lon, lat) = match params.len() {
        2 => {
            let lon: f64 = params[0].parse().map_err(|_| Error::UnrecognizedFormat(original.to_string()))?;
            let lat: f64 = params[1].parse().map_err(|_| Error::UnrecognizedFormat(original.to_string()))?;
            (None, lon, lat)
        }
        3 => {
            let unit: u32 = params[0].parse().map_err(|_| Error::UnrecognizedFormat(original.to_string()))?;
            let lon: f64 = params[1].parse().map_err(|_| Error::UnrecognizedFormat(original.to_string()))?;
            let lat: f64 = params[2].parse().map_err(|_| Error::UnrecognizedFormat(original.to_string()))?;
            (Some(unit), lon, lat)
        }
        _ => return Err(Error::UnrecognizedFormat(original.to_string())),
    };
    Ok(Code::Auto { method, unit_code, lon, lat })
}

/// `TYPE/AUTHORITY/VERSION/CODE`, or the `.../gml/srs/epsg.xml#CODE`
/// shorthand (the `http://www.opengis.net/def/` prefix already stripped).
fn parse_http(original: &str, rest: &str) -> Result<Code> {
    if let Some(hash) = rest.rfind('#') {
        let code = &rest[hash + 1..];
        if code.is_empty() {
            return Err(Error::UnrecognizedFormat(original.to_string()));
        }
        return Ok(Code::Simple {
            authority: "EPSG".to_string(),
            code: code.to_string(),
        });
    }
    let segs: Vec<&str> = rest.split('/').collect();
    if segs.len() < 4 {
        return Err(Error::UnrecognizedFormat(original.to_string()));
    }
    Ok(Code::Simple {
        authority: segs[1].to_uppercase(),
        code: segs[3].to_string(),
    })
}

/// `TYPE:AUTHORITY:VERSION:CODE` (the `urn:ogc:def:` prefix already
/// stripped).
fn parse_urn(original: &str, rest: &str) -> Result<Code> {
    let segs: Vec<&str> = rest.split(':').collect();
    if segs.len() < 4 {
        return Err(Error::UnrecognizedFormat(original.to_string()));
    }
    Ok(Code::Simple {
        authority: segs[1].to_uppercase(),
        code: segs[3].to_string(),
    })
}

/// `AUTHORITY:CODE` or `AUTHORITY::CODE` (empty version).
fn parse_simple(original: &str, s: &str) -> Result<Code> {
    let segs: Vec<&str> = s.split(':').collect();
    match segs.len() {
        2 => Ok(Code::Simple {
            authority: segs[0].to_uppercase(),
            code: segs[1].to_string(),
        }),
        3 if segs[1].is_empty() => Ok(Code::Simple {
            authority: segs[0].to_uppercase(),
            code: segs[2].to_string(),
        }),
        _ => Err(Error::UnrecognizedFormat(original.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_authority_code() {
        assert_eq!(
            parse("EPSG:4326").unwrap(),
            Code::Simple { authority: "EPSG".to_string(), code: "4326".to_string() }
        );
    }

    #[test]
    fn parses_empty_version_form() {
        assert_eq!(
            parse("epsg::4326").unwrap(),
            Code::Simple { authority: "EPSG".to_string(), code: "4326".to_string() }
        );
    }

    #[test]
    fn parses_urn_form() {
        assert_eq!(
            parse("urn:ogc:def:crs:EPSG:8.9:4326").unwrap(),
            Code::Simple { authority: "EPSG".to_string(), code: "4326".to_string() }
        );
    }

    #[test]
    fn parses_http_form() {
        assert_eq!(
            parse("http://www.opengis.net/def/crs/EPSG/0/4326").unwrap(),
            Code::Simple { authority: "EPSG".to_string(), code: "4326".to_string() }
        );
    }

    #[test]
    fn parses_gml_xml_fragment_form() {
        assert_eq!(
            parse("http://www.opengis.net/def/gml/srs/epsg.xml#4326").unwrap(),
            Code::Simple { authority: "EPSG".to_string(), code: "4326".to_string() }
        );
    }

    #[test]
    fn parses_composite_urn() {
        let parsed = parse("urn:ogc:def:crs,crs:EPSG::4326,crs:EPSG::5714").unwrap();
        match parsed {
            Code::Composite(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0], Code::Simple { authority: "EPSG".to_string(), code: "4326".to_string() });
                assert_eq!(parts[1], Code::Simple { authority: "EPSG".to_string(), code: "5714".to_string() });
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn parses_auto_code_without_unit() {
        assert_eq!(
            parse("AUTO:42001,-117,33").unwrap(),
            Code::Auto { method: 42001, unit_code: None, lon: -117.0, lat: 33.0 }
        );
    }

    #[test]
    fn parses_auto2_code_with_unit() {
        assert_eq!(
            parse("AUTO2:42002,9001,-117,33").unwrap(),
            Code::Auto { method: 42002, unit_code: Some(9001), lon: -117.0, lat: 33.0 }
        );
    }

    #[test]
    fn rejects_unrecognized_format() {
        assert!(parse("not a code").is_err());
    }
}
