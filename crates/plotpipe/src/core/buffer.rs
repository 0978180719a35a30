//! Fixed-width numeric table staged for inline transmission
//!
//! A [`DataBuffer`] holds rows of `f64` with a column count fixed at construction.
//! Rows are committed whole, either with [`DataBuffer::push_row`] or value by value
//! through [`DataBuffer::push`] and [`DataBuffer::end_row`]; a row of the wrong
//! width is rejected and never partially stored.

use std::fmt;

use super::error::{PlotError, Result};

/// Row-major numeric table with a fixed column count
#[derive(Debug, Clone, PartialEq)]
pub struct DataBuffer {
    cols: usize,
    data: Vec<f64>,
    pending: Vec<f64>,
}

impl DataBuffer {
    /// Create an empty buffer with `cols` columns
    ///
    /// # Errors
    /// [`PlotError::InvalidColumnCount`] if `cols` is zero.
    pub fn new(cols: usize) -> Result<Self> {
        if cols == 0 {
            return Err(PlotError::InvalidColumnCount { cols });
        }
        Ok(Self {
            cols,
            data: Vec::new(),
            pending: Vec::with_capacity(cols),
        })
    }

    /// Create an empty buffer with room for `rows` rows
    pub fn with_capacity(cols: usize, rows: usize) -> Result<Self> {
        let mut buffer = Self::new(cols)?;
        buffer.data.reserve(cols * rows);
        Ok(buffer)
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of committed rows
    pub fn rows(&self) -> usize {
        self.data.len() / self.cols
    }

    /// Returns true if no row has been committed
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `row`, `col`
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let offset = self.offset(row, col)?;
        self.data.get(offset).copied()
    }

    /// Mutable access to the value at `row`, `col`
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut f64> {
        let offset = self.offset(row, col)?;
        self.data.get_mut(offset)
    }

    /// Borrow one committed row
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let start = row.checked_mul(self.cols)?;
        let end = start.checked_add(self.cols)?;
        self.data.get(start..end)
    }

    /// Flat index of `row`, `col`; `None` when out of range or past `usize::MAX`
    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        row.checked_mul(self.cols)?.checked_add(col)
    }

    /// Iterate over committed rows in insertion order
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    /// Insert a complete row
    ///
    /// # Errors
    /// [`PlotError::RowSizeMismatch`] if the row does not have exactly
    /// [`cols`](Self::cols) values. The buffer is left unchanged.
    pub fn push_row<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        let row: Vec<f64> = row.into_iter().map(Into::into).collect();
        if row.len() != self.cols {
            return Err(PlotError::RowSizeMismatch {
                expected: self.cols,
                actual: row.len(),
            });
        }
        self.data.extend(row);
        Ok(())
    }

    /// Append one value to the pending row
    ///
    /// Nothing is committed until [`end_row`](Self::end_row).
    pub fn push(&mut self, value: impl Into<f64>) -> &mut Self {
        self.pending.push(value.into());
        self
    }

    /// Number of values waiting in the pending row
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Commit the pending row
    ///
    /// The pending row is cleared whether or not it was accepted.
    ///
    /// # Errors
    /// [`PlotError::RowSizeMismatch`] if the pending row has the wrong width.
    pub fn end_row(&mut self) -> Result<()> {
        let row = std::mem::replace(&mut self.pending, Vec::with_capacity(self.cols));
        self.push_row(row)
    }

    /// Parse a whitespace-delimited table
    ///
    /// Blank lines and lines starting with `#` are skipped. The column count is
    /// taken from the first data row; every later row must match it.
    ///
    /// ```rust
    /// use plotpipe::DataBuffer;
    ///
    /// let buffer = DataBuffer::parse("# x y\n0\t5\n1\t6\n").unwrap();
    /// assert_eq!(buffer.cols(), 2);
    /// assert_eq!(buffer.get(1, 1), Some(6.0));
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut buffer: Option<Self> = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let row = trimmed
                .split_whitespace()
                .map(|field| {
                    field.parse::<f64>().map_err(|_| {
                        PlotError::parse_error(format!("not a number: '{}'", field), line_no)
                    })
                })
                .collect::<Result<Vec<f64>>>()?;

            if buffer.is_none() {
                buffer = Some(Self::new(row.len())?);
            }
            if let Some(target) = buffer.as_mut() {
                let actual = row.len();
                let expected = target.cols;
                target.push_row(row).map_err(|_| {
                    PlotError::parse_error(
                        format!("expected {} columns, found {}", expected, actual),
                        line_no,
                    )
                })?;
            }
        }

        buffer.ok_or_else(|| PlotError::parse_error("no data rows", 0))
    }
}

impl fmt::Display for DataBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str("\t")?;
                }
                write!(f, "{}", value)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
