//! This bench renders every page of a synthetic model roughly the size of the
//! published one: four business functions, three practices each, two streams
//! per practice and three maturity levels.

#![allow(missing_docs)]

use std::{fs, path::Path};

use criterion::{Criterion, criterion_group, criterion_main};
use sammgen::{Site, domain::template::Templates};
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn preseed_directory(root: &Path) {
    write(
        root,
        "answer_sets/coverage.yml",
        "id: as1\nvalues:\n  - text: No\n  - text: Yes, for some\n  - text: Yes, for all\n",
    );
    for level in 1..=3 {
        write(
            root,
            &format!("maturity_levels/{level}.yml"),
            &format!("id: ml{level}\nnumber: {level}\n"),
        );
    }

    for f in 0..4 {
        write(
            root,
            &format!("business_functions/{f}.yml"),
            &format!("id: bf{f}\nname: Function {f}\ndescription: Function {f} description.\n"),
        );
        for p in 0..3 {
            let practice = format!("{f}-{p}");
            write(
                root,
                &format!("security_practices/{practice}.yml"),
                &format!(
                    "id: sp{practice}\nfunction: bf{f}\nname: Practice {practice}\n\
                     shortName: P{practice}\nlongDescription: About practice {practice}.\n"
                ),
            );
            for level in 1..=3 {
                write(
                    root,
                    &format!("practice_levels/{practice}-{level}.yml"),
                    &format!(
                        "id: pl{practice}-{level}\nmaturitylevel: ml{level}\n\
                         practice: sp{practice}\nobjective: Objective {level}\n"
                    ),
                );
            }
            for letter in ["A", "B"] {
                let stream = format!("{practice}-{letter}");
                write(
                    root,
                    &format!("streams/{stream}.yml"),
                    &format!(
                        "id: st{stream}\npractice: sp{practice}\nname: Stream {stream}\n\
                         letter: {letter}\n"
                    ),
                );
                for level in 1..=3 {
                    let activity = format!("{stream}-{level}");
                    write(
                        root,
                        &format!("activities/{activity}.yml"),
                        &format!(
                            "id: a{activity}\nstream: st{stream}\nlevel: pl{practice}-{level}\n\
                             benefit: Benefit {level}\nshortDescription: Do {activity}\n\
                             longDescription: |\n  First line.\n  Second line.\n"
                        ),
                    );
                    write(
                        root,
                        &format!("questions/{activity}.yml"),
                        &format!(
                            "activity: a{activity}\nanswerset: as1\ntext: Do you {activity}?\n\
                             quality:\n  - Criterion one\n  - Criterion two\n"
                        ),
                    );
                }
            }
        }
    }
}

fn render_site(c: &mut Criterion) {
    let tmp_dir = TempDir::new().unwrap();
    preseed_directory(tmp_dir.path());
    let site = Site::new(tmp_dir.path().to_path_buf()).load().unwrap();
    let templates = Templates::embedded().unwrap();

    c.bench_function("render site", |b| {
        b.iter(|| site.render(&templates).unwrap());
    });
}

criterion_group!(benches, render_site);
criterion_main!(benches);
