//! Hand-maintained list of the sections of the problem book.

pub const BOOK_ID: &str = "irodov_problems";
pub const BOOK_TITLE: &str = "Problems in General Physics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub part: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    pub id: &'static str,
    pub title: &'static str,
}

const fn entry(id: &'static str, part: &'static str, title: &'static str) -> CatalogEntry {
    CatalogEntry { id, part, title }
}

pub const PARTS: &[Part] = &[
    Part { id: "part_1", title: "Physical Fundamentals of Mechanics" },
    Part { id: "part_2", title: "Thermodynamics and Molecular Physics" },
    Part { id: "part_3", title: "Electrodynamics" },
    Part { id: "part_4", title: "Oscillations and Waves" },
    Part { id: "part_5", title: "Optics" },
    Part { id: "part_6", title: "Atomic and Nuclear Physics" },
];

pub const SECTIONS: &[CatalogEntry] = &[
    entry("1.1", "part_1", "1.1. Kinematics"),
    entry("1.2", "part_1", "1.2. The Fundamental Equation of Dynamics"),
    entry("1.3", "part_1", "1.3. Laws of Conservation of Energy, Momentum, and Angular Momentum"),
    entry("1.4", "part_1", "1.4. Universal Gravitation"),
    entry("1.5", "part_1", "1.5. Dynamics of a Solid Body"),
    entry("1.6", "part_1", "1.6. Elastic Deformations of a Solid Body"),
    entry("1.7", "part_1", "1.7. Hydrodynamics"),
    entry("1.8", "part_1", "1.8. Relativistic Mechanics"),
    entry("2.1", "part_2", "2.1. Equation of the Gas State. Processes"),
    entry("2.2", "part_2", "2.2. The First Law of Thermodynamics. Heat Capacity"),
    entry("2.3", "part_2", "2.3. Kinetic Theory of Gases. Boltzmann's Law and Maxwell's Distribution"),
    entry("2.4", "part_2", "2.4. The Second Law of Thermodynamics. Entropy"),
    entry("2.5", "part_2", "2.5. Liquids. Capillary Effects"),
    entry("2.6", "part_2", "2.6. Phase Transformations"),
    entry("2.7", "part_2", "2.7. Transport Phenomena"),
    entry("3.1", "part_3", "3.1. Constant Electric Field in Vacuum"),
    entry("3.2", "part_3", "3.2. Conductors and Dielectrics in an Electric Field"),
    entry("3.3", "part_3", "3.3. Electric Capacitance. Energy of an Electric Field"),
    entry("3.4", "part_3", "3.4. Electric Current"),
    entry("3.5", "part_3", "3.5. Constant Magnetic Field. Magnetics"),
    entry("3.6", "part_3", "3.6. Electromagnetic Induction. Maxwell's Equations"),
    entry("3.7", "part_3", "3.7. Motion of Charged Particles in Electric and Magnetic Fields"),
    entry("4.1", "part_4", "4.1. Mechanical Oscillations"),
    entry("4.2", "part_4", "4.2. Electric Oscillations"),
    entry("4.3", "part_4", "4.3. Elastic Waves. Acoustics"),
    entry("4.4", "part_4", "4.4. Electromagnetic Waves. Radiation"),
    entry("5.1", "part_5", "5.1. Photometry and Geometrical Optics"),
    entry("5.2", "part_5", "5.2. Interference of Light"),
    entry("5.3", "part_5", "5.3. Diffraction of Light"),
    entry("5.4", "part_5", "5.4. Polarization of Light"),
    entry("5.5", "part_5", "5.5. Dispersion and Absorption of Light"),
    entry("5.6", "part_5", "5.6. Optics of Moving Sources"),
    entry("5.7", "part_5", "5.7. Thermal Radiation. Quantum Nature of Light"),
    entry("6.1", "part_6", "6.1. Scattering of Particles. Rutherford-Bohr Atom"),
    entry("6.2", "part_6", "6.2. Wave Properties of Particles. Schrödinger Equation"),
    entry("6.3", "part_6", "6.3. Properties of Atoms. Spectra"),
    entry("6.4", "part_6", "6.4. Molecules and Crystals"),
    entry("6.5", "part_6", "6.5. Radioactivity"),
    entry("6.6", "part_6", "6.6. Nuclear Reactions"),
    entry("6.7", "part_6", "6.7. Elementary Particles"),
];

pub fn sections_in<'c>(catalog: &'c [CatalogEntry], part: &'c str) -> impl Iterator<Item = &'c CatalogEntry> + 'c {
    catalog.iter().filter(move |e| e.part == part)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = SECTIONS.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), SECTIONS.len());
    }

    #[test]
    fn every_entry_belongs_to_a_known_part() {
        for e in SECTIONS {
            assert!(PARTS.iter().any(|p| p.id == e.part), "unknown part for {}", e.id);
            let major = e.id.split('.').next().unwrap();
            assert_eq!(e.part, format!("part_{}", major));
            assert!(e.title.starts_with(&format!("{}. ", e.id)));
        }
    }

    #[test]
    fn sections_in_part() {
        let part_4: Vec<_> = sections_in(SECTIONS, "part_4").map(|e| e.id).collect();
        assert_eq!(part_4, vec!["4.1", "4.2", "4.3", "4.4"]);
    }
}
