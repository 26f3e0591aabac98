//! ZPlan原生文件格式（.zplan）
//!
//! 16 字节文件头 + Zstd 压缩的 MessagePack 正文。
//! 正文使用带字段名的 MessagePack，可选字段缺省后仍能正确回读。

use crate::atomic::atomic_write;
use crate::document::ProjectFile;
use crate::error::FileError;
use std::io::{Read, Write};
use std::path::Path;

/// 文件魔数 "ZPLN"
const MAGIC: &[u8; 4] = b"ZPLN";

/// 当前文件格式版本
const FORMAT_VERSION: u32 = 1;

/// Zstd 压缩级别
const COMPRESSION_LEVEL: i32 = 3;

const HEADER_LEN: usize = 16;

/// 文件头（16 字节）
#[derive(Debug)]
struct FileHeader {
    magic: [u8; 4],
    version: u32,
    /// 标志位（预留）
    flags: u32,
    compressed_size: u32,
}

impl FileHeader {
    fn new(compressed_size: u32) -> Self {
        Self {
            magic: *MAGIC,
            version: FORMAT_VERSION,
            flags: 0,
            compressed_size,
        }
    }

    fn write(&self, writer: &mut impl Write) -> Result<(), std::io::Error> {
        writer.write_all(&self.magic)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&self.compressed_size.to_le_bytes())?;
        Ok(())
    }

    fn read(reader: &mut impl Read) -> Result<Self, FileError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;

        if &magic != MAGIC {
            return Err(FileError::InvalidFormat(
                "Invalid magic number, not a ZPlan file".to_string(),
            ));
        }

        let mut buf = [0u8; 4];

        reader.read_exact(&mut buf)?;
        let version = u32::from_le_bytes(buf);

        reader.read_exact(&mut buf)?;
        let flags = u32::from_le_bytes(buf);

        reader.read_exact(&mut buf)?;
        let compressed_size = u32::from_le_bytes(buf);

        Ok(Self {
            magic,
            version,
            flags,
            compressed_size,
        })
    }
}

/// 编码为完整文件字节
pub fn to_bytes(project: &ProjectFile) -> Result<Vec<u8>, FileError> {
    let msgpack_data = rmp_serde::to_vec_named(project)?;
    let compressed_data = zstd::encode_all(msgpack_data.as_slice(), COMPRESSION_LEVEL)?;

    let compressed_size = u32::try_from(compressed_data.len())
        .map_err(|_| FileError::Corruption("Project too large to encode".to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed_data.len());
    FileHeader::new(compressed_size).write(&mut bytes)?;
    bytes.extend_from_slice(&compressed_data);
    Ok(bytes)
}

/// 从完整文件字节解码
pub fn from_bytes(bytes: &[u8]) -> Result<ProjectFile, FileError> {
    let mut reader = bytes;
    let header = FileHeader::read(&mut reader)?;

    if header.version > FORMAT_VERSION {
        return Err(FileError::UnsupportedVersion(format!(
            "File version {} is newer than supported version {}",
            header.version, FORMAT_VERSION
        )));
    }

    let expected = header.compressed_size as usize;
    if reader.len() < expected {
        return Err(FileError::Corruption(format!(
            "Expected {} bytes of data, found {}",
            expected,
            reader.len()
        )));
    }

    let msgpack_data = zstd::decode_all(&reader[..expected])?;
    let project: ProjectFile = rmp_serde::from_slice(&msgpack_data)?;
    Ok(project)
}

/// 保存项目到文件
pub fn save(project: &ProjectFile, path: &Path) -> Result<(), FileError> {
    let bytes = to_bytes(project)?;
    atomic_write(path, &bytes)?;

    tracing::info!(
        "Saved {} levels of \"{}\" to {} ({} bytes)",
        project.document.levels.len(),
        project.metadata.name,
        path.display(),
        bytes.len()
    );

    Ok(())
}

/// 从文件加载项目
pub fn load(path: &Path) -> Result<ProjectFile, FileError> {
    let bytes = std::fs::read(path)?;
    let project = from_bytes(&bytes)?;

    tracing::info!(
        "Loaded {} levels of \"{}\" from {}",
        project.document.levels.len(),
        project.metadata.name,
        path.display()
    );

    Ok(project)
}
