use model::core::data_type::DataType;
use mysql_async::{
    Column,
    consts::{ColumnFlags, ColumnType},
};

/// `binary` collation; distinguishes BLOB/VARBINARY from TEXT/VARCHAR,
/// which share their wire column types.
const BINARY_CHARSET: u16 = 63;

/// Maps a result-set column descriptor onto the engine-neutral type.
pub fn mysql_column_type(col: &Column) -> DataType {
    let flags = col.flags();
    let unsigned = flags.contains(ColumnFlags::UNSIGNED_FLAG);
    let binary = col.character_set() == BINARY_CHARSET;

    match col.column_type() {
        ColumnType::MYSQL_TYPE_TINY if col.column_length() == 1 => DataType::Boolean,
        ColumnType::MYSQL_TYPE_TINY | ColumnType::MYSQL_TYPE_SHORT if unsigned => {
            DataType::ShortUnsigned
        }
        ColumnType::MYSQL_TYPE_TINY | ColumnType::MYSQL_TYPE_SHORT => DataType::Short,
        ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG if unsigned => {
            DataType::IntUnsigned
        }
        ColumnType::MYSQL_TYPE_INT24 | ColumnType::MYSQL_TYPE_LONG => DataType::Int,
        ColumnType::MYSQL_TYPE_LONGLONG if unsigned => DataType::LongUnsigned,
        ColumnType::MYSQL_TYPE_LONGLONG => DataType::Long,
        ColumnType::MYSQL_TYPE_FLOAT => DataType::Float,
        ColumnType::MYSQL_TYPE_DOUBLE => DataType::Double,
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => DataType::Decimal,
        ColumnType::MYSQL_TYPE_YEAR => DataType::Year,
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => DataType::Date,
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => DataType::Time,
        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => DataType::Timestamp,
        ColumnType::MYSQL_TYPE_JSON => DataType::Json,
        ColumnType::MYSQL_TYPE_BIT => DataType::Bit,
        ColumnType::MYSQL_TYPE_NULL => DataType::Null,
        ColumnType::MYSQL_TYPE_STRING if flags.contains(ColumnFlags::ENUM_FLAG) => DataType::Enum,
        ColumnType::MYSQL_TYPE_STRING if flags.contains(ColumnFlags::SET_FLAG) => DataType::Set,
        ColumnType::MYSQL_TYPE_ENUM => DataType::Enum,
        ColumnType::MYSQL_TYPE_SET => DataType::Set,
        ColumnType::MYSQL_TYPE_STRING if binary => DataType::Bytes,
        ColumnType::MYSQL_TYPE_STRING => DataType::Char,
        ColumnType::MYSQL_TYPE_VAR_STRING | ColumnType::MYSQL_TYPE_VARCHAR if binary => {
            DataType::Bytes
        }
        ColumnType::MYSQL_TYPE_VAR_STRING | ColumnType::MYSQL_TYPE_VARCHAR => DataType::VarChar,
        ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_BLOB
            if binary =>
        {
            DataType::Bytes
        }
        ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_BLOB => DataType::String,
        other => DataType::Custom(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(ty: ColumnType, flags: ColumnFlags, charset: u16, len: u32) -> Column {
        Column::new(ty)
            .with_flags(flags)
            .with_character_set(charset)
            .with_column_length(len)
    }

    #[test]
    fn integers_honor_unsigned_flag() {
        let signed = column(ColumnType::MYSQL_TYPE_LONGLONG, ColumnFlags::empty(), 63, 20);
        let unsigned = column(
            ColumnType::MYSQL_TYPE_LONGLONG,
            ColumnFlags::UNSIGNED_FLAG,
            63,
            20,
        );
        assert_eq!(mysql_column_type(&signed), DataType::Long);
        assert_eq!(mysql_column_type(&unsigned), DataType::LongUnsigned);
    }

    #[test]
    fn tinyint_one_is_boolean() {
        let col = column(ColumnType::MYSQL_TYPE_TINY, ColumnFlags::empty(), 63, 1);
        assert_eq!(mysql_column_type(&col), DataType::Boolean);
    }

    #[test]
    fn charset_separates_text_from_binary() {
        let text = column(ColumnType::MYSQL_TYPE_BLOB, ColumnFlags::BLOB_FLAG, 255, 65535);
        let blob = column(ColumnType::MYSQL_TYPE_BLOB, ColumnFlags::BLOB_FLAG, 63, 65535);
        let fixed = column(ColumnType::MYSQL_TYPE_STRING, ColumnFlags::empty(), 255, 40);
        assert_eq!(mysql_column_type(&text), DataType::String);
        assert_eq!(mysql_column_type(&blob), DataType::Bytes);
        assert_eq!(mysql_column_type(&fixed), DataType::Char);
    }
}
