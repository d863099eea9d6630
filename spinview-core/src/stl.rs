//! STL parsing for binary and ASCII files
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::opt,
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};
use thiserror::Error;

use crate::geometry::{Mesh, Triangle, Vertex};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Errors produced while decoding STL data
#[derive(Debug, Error, PartialEq)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooShort(usize),

    #[error("binary STL declares {declared} triangles but holds {available}")]
    Truncated { declared: usize, available: usize },

    #[error("malformed binary STL: {0}")]
    Binary(String),

    #[error("malformed ASCII STL: {0}")]
    Ascii(String),
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooShort(data.len()));
    }

    let declared = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let available = (data.len() - HEADER_LEN - 4) / FACET_LEN;
    if available < declared {
        return Err(StlError::Truncated { declared, available });
    }

    binary_stl(data)
        .map(|(_, mesh)| mesh)
        .map_err(|e| StlError::Binary(format!("{:?}", e)))
}

fn binary_stl(input: &[u8]) -> IResult<&[u8], Mesh> {
    let (input, _header) = take(HEADER_LEN)(input)?;
    let (input, triangle_count) = le_u32(input)?;
    let (input, triangles) = count(binary_facet, triangle_count as usize)(input)?;
    Ok((input, Mesh { triangles }))
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, (n, a, b, c, _attributes)) =
        tuple((le_vector3, le_vector3, le_vector3, le_vector3, le_u16))(input)?;
    let vertex = |p: (f32, f32, f32)| Vertex::new(p.0, p.1, p.2, n.0, n.1, n.2);
    Ok((input, with_fallback_normals(Triangle::new(vertex(a), vertex(b), vertex(c)))))
}

fn le_vector3(input: &[u8]) -> IResult<&[u8], (f32, f32, f32)> {
    tuple((le_f32, le_f32, le_f32))(input)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match ascii_stl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(StlError::Ascii(format!("{:?}", e))),
    }
}

fn ascii_stl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = opt(not_line_ending)(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, Mesh { triangles }))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = ascii_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, (a, b, c)) = tuple((ascii_vertex, ascii_vertex, ascii_vertex))(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    let vertex = |p: (f32, f32, f32)| Vertex::new(p.0, p.1, p.2, normal.0, normal.1, normal.2);
    Ok((input, with_fallback_normals(Triangle::new(vertex(a), vertex(b), vertex(c)))))
}

fn ascii_vertex(input: &str) -> IResult<&str, (f32, f32, f32)> {
    preceded(preceded(multispace0, tag("vertex")), ascii_vector3)(input)
}

fn ascii_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    tuple((
        preceded(multispace0, float),
        preceded(multispace1, float),
        preceded(multispace1, float),
    ))(input)
}

/// Exporters often write a zero normal; derive one from the winding instead.
fn with_fallback_normals(mut triangle: Triangle) -> Triangle {
    if triangle.vertices[0].normal.norm_squared() > 1e-12 {
        return triangle;
    }
    if let Some(normal) = triangle.face_normal() {
        for vertex in &mut triangle.vertices {
            vertex.normal = normal;
        }
    }
    triangle
}

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    // Binary files may also start with "solid", so ASCII is only a first guess
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_with(triangles: &[[f32; 12]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for floats in triangles {
            for value in floats {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let mesh = parse_binary_stl(&binary_with(&[])).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_parse_binary_triangle() {
        let data = binary_with(&[[
            0.0, 0.0, 1.0, // normal
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ]]);
        let mesh = parse_binary_stl(&data).unwrap();
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(mesh.triangles[0].vertices[1].position.x, 1.0);
        assert_eq!(mesh.triangles[0].vertices[2].normal.z, 1.0);
    }

    #[test]
    fn test_zero_normal_is_derived_from_winding() {
        let data = binary_with(&[[
            0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ]]);
        let mesh = parse_binary_stl(&data).unwrap();
        assert_eq!(mesh.triangles[0].vertices[0].normal.z, 1.0);
    }

    #[test]
    fn test_truncated_binary() {
        let mut data = binary_with(&[[0.0; 12]]);
        data[80..84].copy_from_slice(&3u32.to_le_bytes());
        assert_eq!(
            parse_binary_stl(&data),
            Err(StlError::Truncated {
                declared: 3,
                available: 1
            })
        );
        assert_eq!(parse_binary_stl(&[0u8; 10]), Err(StlError::TooShort(10)));
    }

    #[test]
    fn test_parse_ascii() {
        let text = "solid tetra
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 1 0 0
    endloop
  endfacet
  facet normal 0 -1 0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 0 1.5e0
    endloop
  endfacet
endsolid tetra
";
        let mesh = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[1].vertices[2].position.z, 1.5);
        assert_eq!(mesh.triangles[0].vertices[0].normal.z, -1.0);
    }

    #[test]
    fn test_binary_starting_with_solid_falls_back() {
        let mut data = binary_with(&[[0.0; 12]]);
        data[..5].copy_from_slice(b"solid");
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.triangles.len(), 1);
    }
}
