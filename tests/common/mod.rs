use std::fs;
use std::path::Path;

pub const MOTIF: [[f64; 4]; 4] = [
    [0.7, 0.1, 0.1, 0.1],
    [0.1, 0.7, 0.1, 0.1],
    [0.0, 0.0, 1.0, 0.0],
    [0.25, 0.25, 0.25, 0.25],
];

pub const SITES: [i64; 4] = [10, 52, 3, 71];

pub const MOTIF_LENGTH: usize = 4;

/// Writes the ground truth of one dataset in the on-disk layout
pub fn write_dataset(dir: &Path, motif_length: usize, sites: &[i64], motif: &[[f64; 4]]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("motiflength.txt"), format!("{}\n", motif_length)).unwrap();

    let sites_text: String = sites.iter().map(|s| format!("{}\n", s)).collect();
    fs::write(dir.join("sites.txt"), sites_text).unwrap();

    let mut motif_text = format!(">MOTIF\t{}\n", motif_length);
    for column in motif {
        let line: Vec<String> = column.iter().map(|v| v.to_string()).collect();
        motif_text.push_str(&line.join(" "));
        motif_text.push('\n');
    }
    motif_text.push('<');
    fs::write(dir.join("motif.txt"), motif_text).unwrap();

    let sequences: String = sites
        .iter()
        .enumerate()
        .map(|(i, _)| format!(">seq{}\n{}\n", i, "ACGT".repeat(25)))
        .collect();
    fs::write(dir.join("sequences.fa"), sequences).unwrap();
}

/// Populates `root` with `count` identical fixture datasets `dataset0..dataset{count-1}`
pub fn write_fixture_store(root: &Path, count: usize) {
    for i in 0..count {
        write_dataset(
            &root.join(format!("dataset{}", i)),
            MOTIF_LENGTH,
            &SITES,
            &MOTIF,
        );
    }
}
