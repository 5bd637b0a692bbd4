//! Shared VIM fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;

use vim_text::bfast::BFastBuilder;
use vim_text::g3d::G3d;
use vim_text::util::{pod_bytes, Vec3};
use vim_text::vim::{Property, SceneNode};

pub const HEADER: &str = "vim=1.0.0\ngenerator=fixture\ncreated=2024-01-01\n";

/// Two triangles of a unit square, one per face group.
pub fn square_geometry() -> G3d {
    let positions = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    G3d::from_triangles(&positions, &[0, 1, 2, 0, 2, 3], Some(&[0, 1])).expect("geometry")
}

pub fn container(buffers: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut b = BFastBuilder::new();
    for (name, bytes) in buffers {
        b.add(*name, bytes.clone()).expect("unique buffer name");
    }
    b.to_bytes().expect("serialize container")
}

fn properties(props: &[Property]) -> Vec<u8> {
    props.iter().flat_map(|p| p.to_bytes()).collect()
}

/// Entity tables: two valid ones and one with an unrecognized buffer.
pub fn entities() -> Vec<u8> {
    let element = container(&[
        ("string:Name", pod_bytes(&[0i32]).to_vec()),
        ("numeric:Height", pod_bytes(&[3.5f64]).to_vec()),
        ("properties", properties(&[Property::new(0, 1, 0)])),
    ]);
    let level = container(&[
        ("index:Rvt.Room:Room", pod_bytes(&[2i32, -1]).to_vec()),
        ("string:Name", pod_bytes(&[1i32, -1]).to_vec()),
    ]);
    let broken = container(&[("mystery", vec![0u8; 4])]);
    container(&[("Rvt.Element", element), ("Broken", broken), ("Rvt.Level", level)])
}

pub fn nodes() -> Vec<u8> {
    let mut identity = [0f32; 16];
    for i in 0..4 {
        identity[i * 5] = 1.0;
    }
    let root = SceneNode { parent: -1, geometry: 0, instance: 0, transform: identity };
    let child = SceneNode { parent: 0, geometry: 1, instance: 1, transform: identity };
    [root.to_bytes(), child.to_bytes()].concat()
}

/// A complete VIM file in memory.
pub fn vim_bytes() -> Vec<u8> {
    let assets = container(&[
        ("readme.txt", b"hello".to_vec()),
        ("a:b?.png", vec![0x89, b'P', b'N', b'G']),
    ]);
    container(&[
        ("header", HEADER.as_bytes().to_vec()),
        ("assets", assets),
        ("strings", b"Wall\0Level 1\0".to_vec()),
        ("geometry", square_geometry().to_bytes().expect("g3d bytes")),
        ("nodes", nodes()),
        ("entities", entities()),
    ])
}

/// Write the fixture to `dir/model.vim` and return its path.
pub fn write_vim(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("model.vim");
    std::fs::write(&path, vim_bytes()).expect("write fixture");
    path
}
