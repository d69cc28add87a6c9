//! Append-only fitness and explored-bounds tables plus their on-disk layout.
//!
//! Both tables are streams of little-endian `f32`. The fitness table writes
//! each generation's values followed by [`FITNESS_ROW_END`], then a single
//! [`FITNESS_TABLE_END`]. The bounds table writes `min.x, min.y, max.x, max.y`
//! per box and closes with a box whose coordinates are all
//! [`BOUNDS_TABLE_END`].

use crate::constants::{BOUNDS_TABLE_END, FITNESS_ROW_END, FITNESS_TABLE_END};
use crate::geometry::{Bounds2, Vec2};
use std::io::{self, Read, Write};
use std::{error::Error, fmt};

/// Per-generation fitness of every robot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitnessHistory {
    generations: Vec<Vec<f32>>,
}

impl FitnessHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(generations: Vec<Vec<f32>>) -> Self {
        Self { generations }
    }

    /// Start a new generation with `population` zeroed entries.
    pub fn push_generation(&mut self, population: usize) {
        self.generations.push(vec![0.0; population]);
    }

    pub fn generations(&self) -> &[Vec<f32>] {
        &self.generations
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn last(&self) -> Option<&[f32]> {
        self.generations.last().map(Vec::as_slice)
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Vec<f32>> {
        self.generations.last_mut()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), HistoryError> {
        for (generation, row) in self.generations.iter().enumerate() {
            for (robot, &value) in row.iter().enumerate() {
                if value == FITNESS_ROW_END || value == FITNESS_TABLE_END {
                    return Err(HistoryError::ReservedValue { generation, robot });
                }
                write_f32(writer, value)?;
            }
            write_f32(writer, FITNESS_ROW_END)?;
        }
        write_f32(writer, FITNESS_TABLE_END)?;
        Ok(())
    }

    /// Decode a fitness table. A stream that ends before the table terminator
    /// yields [`HistoryError::CorruptHistory`] carrying the rows read so far,
    /// including any unterminated trailing row.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, HistoryError> {
        let mut generations = Vec::new();
        let mut row = Vec::new();
        loop {
            let value = match next_f32(reader)? {
                Word::Value(v) => v,
                Word::End => {
                    return Err(corrupt_fitness(Corruption::MissingTerminator, generations, row));
                }
                Word::Partial(bytes) => {
                    return Err(corrupt_fitness(
                        Corruption::TruncatedValue { bytes },
                        generations,
                        row,
                    ));
                }
            };
            if value == FITNESS_TABLE_END {
                if !row.is_empty() {
                    return Err(corrupt_fitness(
                        Corruption::UnterminatedRow { values: row.len() },
                        generations,
                        row,
                    ));
                }
                return Ok(Self { generations });
            }
            if value == FITNESS_ROW_END {
                generations.push(std::mem::take(&mut row));
            } else {
                row.push(value);
            }
        }
    }
}

fn corrupt_fitness(
    reason: Corruption,
    mut generations: Vec<Vec<f32>>,
    row: Vec<f32>,
) -> HistoryError {
    if !row.is_empty() {
        generations.push(row);
    }
    HistoryError::CorruptHistory {
        reason,
        recovered: Recovered::Fitness(FitnessHistory { generations }),
    }
}

pub fn write_bounds<W: Write>(bounds: &[Bounds2], writer: &mut W) -> Result<(), HistoryError> {
    for b in bounds {
        write_box(writer, b)?;
    }
    let end = Vec2::new(BOUNDS_TABLE_END, BOUNDS_TABLE_END);
    write_box(writer, &Bounds2 { min: end, max: end })?;
    Ok(())
}

/// Decode a bounds table, stopping at the first box whose `min.x` is the
/// sentinel coordinate.
pub fn read_bounds<R: Read>(reader: &mut R) -> Result<Vec<Bounds2>, HistoryError> {
    let mut bounds = Vec::new();
    loop {
        let mut coords = [0.0f32; 4];
        for (i, slot) in coords.iter_mut().enumerate() {
            match next_f32(reader)? {
                Word::Value(v) => *slot = v,
                Word::End if i == 0 => {
                    return Err(HistoryError::CorruptHistory {
                        reason: Corruption::MissingTerminator,
                        recovered: Recovered::Bounds(bounds),
                    });
                }
                Word::End => {
                    return Err(HistoryError::CorruptHistory {
                        reason: Corruption::TruncatedValue { bytes: i * 4 },
                        recovered: Recovered::Bounds(bounds),
                    });
                }
                Word::Partial(bytes) => {
                    return Err(HistoryError::CorruptHistory {
                        reason: Corruption::TruncatedValue { bytes: i * 4 + bytes },
                        recovered: Recovered::Bounds(bounds),
                    });
                }
            }
        }
        if coords[0] == BOUNDS_TABLE_END {
            return Ok(bounds);
        }
        bounds.push(Bounds2 {
            min: Vec2::new(coords[0], coords[1]),
            max: Vec2::new(coords[2], coords[3]),
        });
    }
}

/// Fitness table followed by the bounds table, the order a saved run uses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistorySnapshot {
    pub fitness: FitnessHistory,
    pub bounds: Vec<Bounds2>,
}

impl HistorySnapshot {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), HistoryError> {
        self.fitness.write_to(writer)?;
        write_bounds(&self.bounds, writer)
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, HistoryError> {
        let fitness = FitnessHistory::read_from(reader)?;
        let bounds = read_bounds(reader)?;
        Ok(Self { fitness, bounds })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corruption {
    /// Stream ended before the table terminator.
    MissingTerminator,
    /// Stream ended inside a value or box; `bytes` were left over.
    TruncatedValue { bytes: usize },
    /// Table terminator arrived while a row was still open.
    UnterminatedRow { values: usize },
}

impl fmt::Display for Corruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corruption::MissingTerminator => write!(f, "missing table terminator"),
            Corruption::TruncatedValue { bytes } => {
                write!(f, "stream ends with {bytes} stray bytes")
            }
            Corruption::UnterminatedRow { values } => {
                write!(f, "final row of {values} values has no row terminator")
            }
        }
    }
}

/// Whatever could be decoded before the stream went bad.
#[derive(Debug, Clone, PartialEq)]
pub enum Recovered {
    Fitness(FitnessHistory),
    Bounds(Vec<Bounds2>),
}

#[derive(Debug)]
pub enum HistoryError {
    Io(io::Error),
    CorruptHistory {
        reason: Corruption,
        recovered: Recovered,
    },
    /// A fitness value collides with a sentinel and cannot be encoded.
    ReservedValue { generation: usize, robot: usize },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Io(e) => write!(f, "history i/o failed: {e}"),
            HistoryError::CorruptHistory { reason, recovered } => {
                let (table, count) = match recovered {
                    Recovered::Fitness(h) => ("fitness", h.len()),
                    Recovered::Bounds(b) => ("bounds", b.len()),
                };
                write!(
                    f,
                    "corrupt {table} history ({reason}); recovered {count} entries"
                )
            }
            HistoryError::ReservedValue { generation, robot } => write!(
                f,
                "fitness of robot {robot} in generation {generation} is a reserved sentinel"
            ),
        }
    }
}

impl Error for HistoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HistoryError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for HistoryError {
    fn from(err: io::Error) -> Self {
        HistoryError::Io(err)
    }
}

enum Word {
    Value(f32),
    End,
    Partial(usize),
}

fn next_f32<R: Read>(reader: &mut R) -> io::Result<Word> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(match filled {
        0 => Word::End,
        4 => Word::Value(f32::from_le_bytes(buf)),
        n => Word::Partial(n),
    })
}

fn write_f32<W: Write>(writer: &mut W, value: f32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn write_box<W: Write>(writer: &mut W, b: &Bounds2) -> io::Result<()> {
    for v in [b.min.x, b.min.y, b.max.x, b.max.y] {
        write_f32(writer, v)?;
    }
    Ok(())
}
