use depthfuse_core::PointCloud;
use std::fs;
use std::io::{self, BufWriter, Write as _};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

/// Property type as declared in the PLY header.
#[derive(Debug, Clone, Copy)]
enum PropType {
    Float,
    Double,
    Uchar,
}

impl PropType {
    fn byte_size(self) -> usize {
        match self {
            PropType::Float => 4,
            PropType::Double => 8,
            PropType::Uchar => 1,
        }
    }
}

struct PlyHeader {
    format: PlyFormat,
    vertex_count: usize,
    property_names: Vec<String>,
    property_types: Vec<PropType>,
    header_end_offset: usize,
}

impl PlyHeader {
    fn position(&self, name: &str) -> Option<usize> {
        self.property_names.iter().position(|n| n == name)
    }

    fn offset_of(&self, prop_idx: usize) -> usize {
        self.property_types[..prop_idx]
            .iter()
            .map(|t| t.byte_size())
            .sum()
    }
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn parse_ply_header(data: &[u8]) -> io::Result<PlyHeader> {
    let end_marker = b"end_header\n";
    let header_end = find_bytes(data, end_marker)
        .ok_or_else(|| invalid("missing end_header in PLY file"))?;
    let header_end_offset = header_end + end_marker.len();

    let header_text = std::str::from_utf8(&data[..header_end])
        .map_err(|_| invalid("PLY header not valid UTF-8"))?;

    let mut format = None;
    let mut vertex_count: usize = 0;
    let mut property_names: Vec<String> = Vec::new();
    let mut property_types: Vec<PropType> = Vec::new();
    let mut in_vertex_element = false;

    let mut lines = header_text.lines().map(str::trim);
    if lines.next() != Some("ply") {
        return Err(invalid("file does not start with 'ply'"));
    }

    for line in lines {
        if line.starts_with("format") {
            if line.contains("ascii") {
                format = Some(PlyFormat::Ascii);
            } else if line.contains("binary_little_endian") {
                format = Some(PlyFormat::BinaryLittleEndian);
            } else {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("unsupported PLY format: {}", line),
                ));
            }
        } else if line.starts_with("element vertex") {
            in_vertex_element = true;
            let count = line
                .split_whitespace()
                .nth(2)
                .ok_or_else(|| invalid("invalid element vertex line"))?;
            vertex_count = count
                .parse::<usize>()
                .map_err(|e| invalid(format!("invalid vertex count: {}", e)))?;
        } else if line.starts_with("element") {
            in_vertex_element = false;
        } else if line.starts_with("property") && in_vertex_element {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                let ptype = match parts[1] {
                    "float" | "float32" => PropType::Float,
                    "double" | "float64" => PropType::Double,
                    "uchar" | "uint8" => PropType::Uchar,
                    other => {
                        return Err(io::Error::new(
                            io::ErrorKind::Unsupported,
                            format!("unsupported property type: {}", other),
                        ));
                    }
                };
                property_types.push(ptype);
                property_names.push(parts[2].to_string());
            }
        }
    }

    let format = format.ok_or_else(|| invalid("PLY format line missing"))?;

    Ok(PlyHeader {
        format,
        vertex_count,
        property_names,
        property_types,
        header_end_offset,
    })
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn color_to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn byte_to_color(b: u8) -> f32 {
    b as f32 / 255.0
}

/// Read an ASCII or binary little-endian PLY file.
///
/// `uchar` colors are mapped to `[0, 1]`.
pub fn read_ply(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let data = fs::read(&path)?;
    let header = parse_ply_header(&data)?;

    let (idx_x, idx_y, idx_z) = match (
        header.position("x"),
        header.position("y"),
        header.position("z"),
    ) {
        (Some(ix), Some(iy), Some(iz)) => (ix, iy, iz),
        _ => return Err(invalid("PLY file missing required x, y, z properties")),
    };

    let rgb = match (
        header.position("red"),
        header.position("green"),
        header.position("blue"),
    ) {
        (Some(r), Some(g), Some(b)) => Some([r, g, b]),
        _ => None,
    };

    let vertex_count = header.vertex_count;
    let body = &data[header.header_end_offset..];
    let stride: usize = header.property_types.iter().map(|t| t.byte_size()).sum();

    // The declared count is untrusted; never reserve more rows than the body
    // can hold.
    let capacity = match header.format {
        PlyFormat::Ascii => vertex_count.min(body.len() / header.property_names.len().max(1)),
        PlyFormat::BinaryLittleEndian => {
            let needed = vertex_count
                .checked_mul(stride)
                .ok_or_else(|| invalid(format!("vertex count {} is too large", vertex_count)))?;
            if body.len() < needed {
                return Err(invalid(format!(
                    "PLY binary body too short: need {} bytes, got {}",
                    needed,
                    body.len()
                )));
            }
            vertex_count
        }
    };
    let mut cloud = PointCloud::with_capacity(capacity, rgb.is_some());

    match header.format {
        PlyFormat::Ascii => {
            let body =
                std::str::from_utf8(body).map_err(|_| invalid("PLY body not valid UTF-8"))?;
            let rows = body
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(vertex_count);
            for line in rows {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < header.property_names.len() {
                    return Err(invalid(format!(
                        "vertex line has {} fields, expected {}",
                        parts.len(),
                        header.property_names.len()
                    )));
                }

                let parse_f32 = |idx: usize| -> io::Result<f32> {
                    parts[idx]
                        .parse::<f32>()
                        .map_err(|e| invalid(format!("failed to parse float: {}", e)))
                };
                let parse_u8 = |idx: usize| -> io::Result<u8> {
                    parts[idx]
                        .parse::<u8>()
                        .map_err(|e| invalid(format!("failed to parse color byte: {}", e)))
                };

                let p = [parse_f32(idx_x)?, parse_f32(idx_y)?, parse_f32(idx_z)?];
                match rgb {
                    Some([r, g, b]) => cloud.push_colored(
                        p,
                        [
                            byte_to_color(parse_u8(r)?),
                            byte_to_color(parse_u8(g)?),
                            byte_to_color(parse_u8(b)?),
                        ],
                    ),
                    None => cloud.push(p),
                }
            }
            if cloud.len() < vertex_count {
                return Err(invalid(format!(
                    "PLY body has {} vertices, header declares {}",
                    cloud.len(),
                    vertex_count
                )));
            }
        }
        PlyFormat::BinaryLittleEndian => {
            let read_f32_at = |row: &[u8], prop_idx: usize| -> f32 {
                let off = header.offset_of(prop_idx);
                match header.property_types[prop_idx] {
                    PropType::Double => {
                        let mut b = [0u8; 8];
                        b.copy_from_slice(&row[off..off + 8]);
                        f64::from_le_bytes(b) as f32
                    }
                    PropType::Uchar => row[off] as f32,
                    PropType::Float => {
                        f32::from_le_bytes([row[off], row[off + 1], row[off + 2], row[off + 3]])
                    }
                }
            };
            let read_u8_at = |row: &[u8], prop_idx: usize| -> u8 { row[header.offset_of(prop_idx)] };

            for row in body.chunks_exact(stride.max(1)).take(vertex_count) {
                let p = [
                    read_f32_at(row, idx_x),
                    read_f32_at(row, idx_y),
                    read_f32_at(row, idx_z),
                ];
                match rgb {
                    Some([r, g, b]) => cloud.push_colored(
                        p,
                        [
                            byte_to_color(read_u8_at(row, r)),
                            byte_to_color(read_u8_at(row, g)),
                            byte_to_color(read_u8_at(row, b)),
                        ],
                    ),
                    None => cloud.push(p),
                }
            }
        }
    }

    Ok(cloud)
}

fn write_header(w: &mut impl io::Write, format: &str, cloud: &PointCloud) -> io::Result<()> {
    w.write_all(b"ply\n")?;
    writeln!(w, "format {} 1.0", format)?;
    w.write_all(b"comment generated by depthfuse\n")?;
    writeln!(w, "element vertex {}", cloud.len())?;
    w.write_all(b"property float x\n")?;
    w.write_all(b"property float y\n")?;
    w.write_all(b"property float z\n")?;

    if cloud.has_colors() {
        w.write_all(b"property uchar red\n")?;
        w.write_all(b"property uchar green\n")?;
        w.write_all(b"property uchar blue\n")?;
    }

    w.write_all(b"end_header\n")
}

/// Write a PLY file in ASCII format. Colors are stored as `uchar`.
pub fn write_ply(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);
    write_header(&mut w, "ascii", cloud)?;

    for i in 0..cloud.len() {
        write!(w, "{} {} {}", cloud.x[i], cloud.y[i], cloud.z[i])?;
        if let Some([r, g, b]) = cloud.color(i) {
            write!(
                w,
                " {} {} {}",
                color_to_byte(r),
                color_to_byte(g),
                color_to_byte(b)
            )?;
        }
        w.write_all(b"\n")?;
    }

    w.flush()
}

/// Write a PLY file in binary_little_endian format.
pub fn write_ply_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);
    write_header(&mut w, "binary_little_endian", cloud)?;

    for i in 0..cloud.len() {
        w.write_all(&cloud.x[i].to_le_bytes())?;
        w.write_all(&cloud.y[i].to_le_bytes())?;
        w.write_all(&cloud.z[i].to_le_bytes())?;

        if let Some([r, g, b]) = cloud.color(i) {
            w.write_all(&[color_to_byte(r), color_to_byte(g), color_to_byte(b)])?;
        }
    }

    w.flush()
}
