use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Component, Path};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Unpack a tar archive, gzip-compressed or not, into `dest`.
///
/// Compression is detected from the file's leading bytes rather than its
/// name, since raw artifacts are stored without an extension.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).with_context(|| format!("opening {}", archive.display()))?;
    let mut reader = BufReader::new(file);

    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if gzipped {
        unpack(GzDecoder::new(reader), dest)
    } else {
        unpack(reader, dest)
    }
}

fn unpack<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries().context("reading tar")? {
        let mut entry = entry.context("reading tar entry")?;
        let path = entry.path().context("reading entry path")?.into_owned();

        // Reject anything that could land outside dest
        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            bail!("tar contains unsafe path: {}", path.display());
        }

        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        // unpack_in refuses to write through symlinks leading out of dest
        let unpacked = entry
            .unpack_in(dest)
            .with_context(|| format!("unpacking {}", path.display()))?;
        if !unpacked {
            bail!("tar entry escapes destination: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        use std::io::Write;
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_extract_gzipped_tar() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("cri-tools.tar.gz");
        std::fs::write(&archive, gzip(&tar_bytes(&[("crictl", b"#!/bin/sh\n")]))).unwrap();

        extract(&archive, tmp.path()).unwrap();

        assert_eq!(std::fs::read(tmp.path().join("crictl")).unwrap(), b"#!/bin/sh\n");
    }

    #[test]
    fn test_extract_plain_tar_without_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("kubelet");
        std::fs::write(&archive, tar_bytes(&[("bin/kubelet", b"elf")])).unwrap();

        extract(&archive, tmp.path()).unwrap();

        assert_eq!(std::fs::read(tmp.path().join("bin/kubelet")).unwrap(), b"elf");
    }

    #[test]
    fn test_extract_rejects_parent_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("evil.tar");

        // tar::Builder refuses `..`, so write the name into the header by hand
        let mut header = tar::Header::new_gnu();
        header.as_gnu_mut().unwrap().name[..9].copy_from_slice(b"../escape");
        header.set_size(1);
        header.set_mode(0o644);
        header.set_cksum();
        let mut builder = tar::Builder::new(Vec::new());
        builder.append(&header, &b"x"[..]).unwrap();
        std::fs::write(&archive, builder.into_inner().unwrap()).unwrap();

        let dest = tmp.path().join("dest");
        std::fs::create_dir(&dest).unwrap();
        let err = extract(&archive, &dest).unwrap_err();
        assert!(err.to_string().contains("unsafe path"));
        assert!(!tmp.path().join("escape").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_rejects_write_through_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tmp.path().join("outside");
        let dest = tmp.path().join("dest");
        std::fs::create_dir(&outside).unwrap();
        std::fs::create_dir(&dest).unwrap();

        let mut builder = tar::Builder::new(Vec::new());
        let mut link = tar::Header::new_gnu();
        link.set_entry_type(tar::EntryType::Symlink);
        link.set_size(0);
        link.set_mode(0o777);
        link.set_link_name(&outside).unwrap();
        builder.append_data(&mut link, "link", std::io::empty()).unwrap();

        let mut file = tar::Header::new_gnu();
        file.set_size(1);
        file.set_mode(0o644);
        builder.append_data(&mut file, "link/pwned", &b"x"[..]).unwrap();

        let archive = tmp.path().join("cri-o.tar");
        std::fs::write(&archive, builder.into_inner().unwrap()).unwrap();

        assert!(extract(&archive, &dest).is_err());
        assert!(!outside.join("pwned").exists());
    }

    #[test]
    fn test_extract_garbage_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("cri-o.tar.gz");
        std::fs::write(&archive, gzip(b"definitely not a tarball")).unwrap();

        assert!(extract(&archive, tmp.path()).is_err());
    }

    #[test]
    fn test_extract_missing_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(extract(&tmp.path().join("missing.tar.gz"), tmp.path()).is_err());
    }
}
