//! Sequential typed reader over a Parquet container.
//!
//! Rows are consumed column by column in schema order, each column either read
//! or skipped, and closed with `end_row()`. Row groups are crossed
//! transparently; once the last row has been ended the reader drops the
//! container and all column readers and reports `eof()`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use pqstream_core::error::Error as StreamError;
use pqstream_core::guard;
use pqstream_core::schema::{ColumnType, Schema};
use pqstream_core::value::{FromValue, Value};
use tracing::{debug, trace};

use super::column_cursor::ColumnCursor;
use crate::binder::bind_schema;
use crate::error::Result;

pub struct StreamReader<R: ChunkReader + 'static> {
    /// Released at end of data.
    file_reader: Option<SerializedFileReader<R>>,
    schema: Arc<Schema>,
    /// One cursor per column of the current row group; empty at eof.
    columns: Vec<ColumnCursor>,
    column_index: usize,
    row_group_index: usize,
    num_row_groups: usize,
    row_group_rows: u64,
    row_group_position: u64,
    current_row: u64,
    num_rows: u64,
    eof: bool,
}

impl StreamReader<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::try_new(file)
    }
}

impl<R: ChunkReader + 'static> StreamReader<R> {
    pub fn try_new(source: R) -> Result<Self> {
        Self::new(SerializedFileReader::new(source)?)
    }

    /// Wrap an open container and position at its first non-empty row group.
    pub fn new(file_reader: SerializedFileReader<R>) -> Result<Self> {
        let metadata = file_reader.metadata();
        let schema = Arc::new(bind_schema(metadata.file_metadata().schema_descr())?);
        let num_rows = metadata.file_metadata().num_rows().max(0) as u64;
        let num_row_groups = metadata.num_row_groups();

        let mut reader = Self {
            file_reader: Some(file_reader),
            schema,
            columns: Vec::new(),
            column_index: 0,
            row_group_index: 0,
            num_row_groups,
            row_group_rows: 0,
            row_group_position: 0,
            current_row: 0,
            num_rows,
            eof: false,
        };
        debug!(
            columns = reader.schema.num_columns(),
            rows = num_rows,
            row_groups = num_row_groups,
            "opened stream reader"
        );
        reader.open_row_group(0)?;
        Ok(reader)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn num_columns(&self) -> usize {
        self.schema.num_columns()
    }

    /// Total rows in the container, from the footer.
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    pub fn num_row_groups(&self) -> usize {
        self.num_row_groups
    }

    /// Index of the row group being read; equals `num_row_groups()` at eof.
    pub fn current_row_group(&self) -> usize {
        self.row_group_index
    }

    pub fn current_column(&self) -> usize {
        self.column_index
    }

    /// Rows ended or skipped so far.
    pub fn current_row(&self) -> u64 {
        self.current_row
    }

    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Read a value from a column that must hold one in every row.
    pub fn read<T: FromValue>(&mut self) -> Result<T> {
        self.ensure_open()?;
        guard::check(&self.schema, self.column_index, T::column_type())?;
        let value = self.read_required()?;
        self.convert(value)
    }

    /// Read a value that may be absent.
    pub fn read_optional<T: FromValue>(&mut self) -> Result<Option<T>> {
        self.ensure_open()?;
        guard::check(&self.schema, self.column_index, T::column_type())?;
        match self.read_present_or_absent()? {
            Some(value) => self.convert(value).map(Some),
            None => Ok(None),
        }
    }

    /// Read a fixed-length value; `len` must equal the declared length.
    pub fn read_fixed(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure_open()?;
        guard::check(&self.schema, self.column_index, ColumnType::fixed(len))?;
        let index = self.column_index;
        match self.read_required()? {
            Value::Fixed(bytes) => Ok(bytes),
            other => Err(self.decode_error(index, &other)),
        }
    }

    /// Read the current column as whatever its descriptor says it holds.
    /// Absent values of nullable columns come back as `None`.
    pub fn read_value(&mut self) -> Result<Option<Value>> {
        self.ensure_open()?;
        let nullable = self
            .schema
            .column(self.column_index)
            .ok_or(StreamError::IndexOutOfRange {
                index: self.column_index,
                width: self.schema.num_columns(),
            })?
            .nullable;
        if nullable {
            self.read_present_or_absent()
        } else {
            self.read_required().map(Some)
        }
    }

    /// Read the remaining columns of the current row and end it.
    pub fn read_row(&mut self) -> Result<Vec<Option<Value>>> {
        self.ensure_open()?;
        let mut row = Vec::with_capacity(self.num_columns() - self.column_index);
        while self.column_index < self.num_columns() {
            row.push(self.read_value()?);
        }
        self.end_row()?;
        Ok(row)
    }

    /// Finish the current row. Every column must have been read or skipped.
    pub fn end_row(&mut self) -> Result<()> {
        self.ensure_open()?;
        let num_columns = self.num_columns();
        if self.column_index < num_columns {
            return Err(StreamError::IncompleteRow {
                columns_done: self.column_index,
                num_columns,
            }
            .into());
        }
        self.column_index = 0;
        self.current_row += 1;
        self.row_group_position += 1;
        if self.row_group_position >= self.row_group_rows {
            self.open_row_group(self.row_group_index + 1)?;
        }
        Ok(())
    }

    /// Skip up to `n` columns of the current row. Never crosses the row
    /// boundary; `end_row()` is still required afterwards.
    pub fn skip_columns(&mut self, n: usize) -> Result<usize> {
        if self.eof {
            return Ok(0);
        }
        let start = self.column_index;
        let end = start.saturating_add(n).min(self.num_columns());
        while self.column_index < end {
            let cursor = self.cursor()?;
            let skipped = cursor.skip(1);
            self.column_index += 1;
            let skipped = skipped?;
            if skipped != 1 {
                return Err(self.count_mismatch(self.column_index - 1, skipped));
            }
        }
        Ok(end - start)
    }

    /// Skip up to `n` whole rows, crossing row groups. Only legal between rows.
    /// Returns fewer than `n` only when the end of data is reached.
    pub fn skip_rows(&mut self, n: u64) -> Result<u64> {
        if self.column_index != 0 {
            return Err(StreamError::IllegalSkip {
                column_index: self.column_index,
            }
            .into());
        }
        let mut skipped = 0;
        while skipped < n && !self.eof {
            let remaining = self.row_group_rows - self.row_group_position;
            let step = remaining.min(n - skipped);
            if step == remaining {
                self.open_row_group(self.row_group_index + 1)?;
            } else {
                for column in &mut self.columns {
                    let done = column.skip(step as usize)?;
                    if done as u64 != step {
                        return Err(StreamError::ValueCountMismatch {
                            column: column.name().to_owned(),
                            count: done,
                        }
                        .into());
                    }
                }
                self.row_group_position += step;
            }
            skipped += step;
            self.current_row += step;
        }
        trace!(requested = n, skipped, row = self.current_row, "skipped rows");
        Ok(skipped)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.eof {
            return Err(StreamError::EndOfStream.into());
        }
        Ok(())
    }

    fn cursor(&mut self) -> Result<&mut ColumnCursor> {
        let width = self.schema.num_columns();
        self.columns
            .get_mut(self.column_index)
            .ok_or_else(|| {
                StreamError::IndexOutOfRange {
                    index: self.column_index,
                    width,
                }
                .into()
            })
    }

    /// Take the current column's slot from its cursor. The engine consumes
    /// the slot even when decoding fails, so the column position always
    /// advances with it.
    fn consume_slot(&mut self) -> Result<(usize, Option<Value>)> {
        let slot = self.cursor()?.read_slot();
        self.column_index += 1;
        slot
    }

    /// Exactly one value must come back.
    fn read_required(&mut self) -> Result<Value> {
        let index = self.column_index;
        match self.consume_slot()? {
            (1, Some(value)) => Ok(value),
            (count, _) => Err(self.count_mismatch(index, count)),
        }
    }

    /// One value means present, none means absent.
    fn read_present_or_absent(&mut self) -> Result<Option<Value>> {
        let index = self.column_index;
        match self.consume_slot()? {
            (1, Some(value)) => Ok(Some(value)),
            (0, None) => Ok(None),
            (count, _) => Err(self.count_mismatch(index, count)),
        }
    }

    fn count_mismatch(&self, index: usize, count: usize) -> crate::error::Error {
        StreamError::ValueCountMismatch {
            column: self
                .schema
                .column(index)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            count,
        }
        .into()
    }

    fn convert<T: FromValue>(&self, value: Value) -> Result<T> {
        let description = format!("{:?}", value);
        T::from_value(value).ok_or_else(|| {
            StreamError::Invariant(format!(
                "decoded {} does not convert to {}",
                description,
                T::column_type()
            ))
            .into()
        })
    }

    fn decode_error(&self, index: usize, value: &Value) -> crate::error::Error {
        StreamError::Invariant(format!(
            "decoded {:?} does not match column {}",
            value, index
        ))
        .into()
    }

    /// Position at the first row group at or after `start` that holds rows,
    /// or release everything if there is none.
    fn open_row_group(&mut self, start: usize) -> Result<()> {
        self.columns.clear();
        self.column_index = 0;
        let Some(file_reader) = self.file_reader.as_ref() else {
            self.release();
            return Ok(());
        };

        let mut index = start;
        while index < self.num_row_groups {
            let rows = file_reader.metadata().row_group(index).num_rows();
            if rows > 0 {
                let row_group = file_reader.get_row_group(index)?;
                let mut columns = Vec::with_capacity(self.schema.num_columns());
                for (i, descriptor) in self.schema.columns().iter().enumerate() {
                    columns.push(ColumnCursor::new(descriptor, row_group.get_column_reader(i)?));
                }
                self.columns = columns;
                self.row_group_index = index;
                self.row_group_rows = rows as u64;
                self.row_group_position = 0;
                debug!(row_group = index, rows, "opened row group");
                return Ok(());
            }
            index += 1;
        }
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        self.columns.clear();
        self.file_reader = None;
        self.row_group_index = self.num_row_groups;
        self.row_group_rows = 0;
        self.row_group_position = 0;
        self.eof = true;
        debug!(rows = self.current_row, "reached end of stream");
    }
}
