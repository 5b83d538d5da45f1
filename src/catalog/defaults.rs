use super::{ALL_DAYS, CategoryCatalog, Catalog, CatalogError, Division, EventDefinition, TimeWindow};

const MON_TUE_THU_FRI: [u8; 4] = [0, 1, 3, 4];

fn hms(start: (u32, u32, u32), end: (u32, u32, u32)) -> Result<TimeWindow, CatalogError> {
    TimeWindow::from_hms(start, end).ok_or_else(|| {
        CatalogError::InvalidTime(format!(
            "{:02}:{:02}:{:02}-{:02}:{:02}:{:02}",
            start.0, start.1, start.2, end.0, end.1, end.2
        ))
    })
}

fn w(start: (u32, u32), end: (u32, u32)) -> Result<TimeWindow, CatalogError> {
    hms((start.0, start.1, 0), (end.0, end.1, 0))
}

fn category(name: &str, events: Vec<EventDefinition>) -> CategoryCatalog {
    CategoryCatalog {
        name: name.to_string(),
        events,
    }
}

fn division(key: String, categories: Vec<CategoryCatalog>) -> Division {
    Division {
        sheet_target: key.clone(),
        key,
        categories,
    }
}

/// Built-in event table. Windows open five minutes before the in-game start.
pub fn builtin() -> Result<Catalog, CatalogError> {
    let mut divisions = vec![north_america(44)?];
    for server in [43, 14] {
        divisions.push(europe(server)?);
    }
    for server in [23, 43, 63, 71] {
        divisions.push(south_america(server)?);
    }
    Ok(Catalog { divisions })
}

fn north_america(server: u32) -> Result<Division, CatalogError> {
    Ok(division(
        format!("NORTH AMERICA {server}"),
        vec![
            category(
                "wb",
                vec![
                    EventDefinition::new("WB 10:00 + Pico", &ALL_DAYS, vec![w((10, 55), (11, 15))?]),
                    EventDefinition::new("WB 12:00 + Praça", &ALL_DAYS, vec![w((12, 55), (13, 15))?]),
                    EventDefinition::new("WB 20:00", &ALL_DAYS, vec![w((20, 55), (21, 15))?]),
                    EventDefinition::new("WB 22:00 + Pico", &ALL_DAYS, vec![w((22, 55), (23, 15))?]),
                    EventDefinition::new("WB 00:00 + Praça", &ALL_DAYS, vec![w((0, 55), (1, 15))?]),
                ],
            ),
            category(
                "praça-pico",
                vec![
                    EventDefinition::new(
                        "Pico",
                        &ALL_DAYS,
                        vec![
                            w((1, 55), (2, 15))?,
                            w((4, 55), (5, 15))?,
                            w((7, 55), (8, 15))?,
                            w((13, 55), (14, 15))?,
                            w((16, 55), (17, 15))?,
                            w((19, 55), (20, 15))?,
                        ],
                    ),
                    EventDefinition::new(
                        "Praça",
                        &ALL_DAYS,
                        vec![
                            w((3, 55), (4, 15))?,
                            w((6, 55), (7, 15))?,
                            w((9, 55), (10, 15))?,
                            w((15, 55), (16, 15))?,
                            w((18, 55), (19, 15))?,
                            w((21, 55), (22, 15))?,
                        ],
                    ),
                ],
            ),
            category(
                "eventos",
                vec![
                    EventDefinition::new(
                        "Krukan/Nerkan/Turkan/Utukan",
                        &MON_TUE_THU_FRI,
                        vec![hms((23, 55, 0), (0, 15, 59))?],
                    ),
                    EventDefinition::new("Guerra de Vale", &[2], vec![hms((23, 45, 0), (0, 10, 59))?]),
                    EventDefinition::new("Defesa de Cristal", &[3], vec![hms((23, 45, 0), (0, 10, 59))?]),
                    EventDefinition::new("Saque do Castelo", &[4], vec![hms((23, 45, 0), (0, 10, 59))?]),
                ],
            ),
        ],
    ))
}

fn europe(server: u32) -> Result<Division, CatalogError> {
    // Server 14 keeps its events in a differently named channel.
    let events_channel = if server == 14 { "eventos-juja" } else { "eventos" };

    Ok(division(
        format!("EUROPE {server}"),
        vec![
            category(
                "wb",
                vec![
                    EventDefinition::new("WB 10:00 + Pico", &ALL_DAYS, vec![w((4, 55), (5, 15))?]),
                    EventDefinition::new("WB 12:00 + Praça", &ALL_DAYS, vec![w((6, 55), (7, 15))?]),
                    EventDefinition::new("WB 20:00", &ALL_DAYS, vec![w((14, 55), (15, 15))?]),
                    EventDefinition::new("WB 22:00 + Pico", &ALL_DAYS, vec![w((16, 55), (17, 15))?]),
                    EventDefinition::new("WB 00:00 + Praça", &ALL_DAYS, vec![w((18, 55), (19, 15))?]),
                ],
            ),
            category(
                "praça-pico",
                vec![
                    EventDefinition::new(
                        "Pico",
                        &ALL_DAYS,
                        vec![
                            w((19, 55), (20, 15))?,
                            w((22, 55), (23, 15))?,
                            w((1, 55), (2, 15))?,
                            w((7, 55), (8, 15))?,
                            w((10, 55), (11, 15))?,
                            w((13, 55), (14, 15))?,
                        ],
                    ),
                    EventDefinition::new(
                        "Praça",
                        &ALL_DAYS,
                        vec![
                            w((21, 55), (22, 15))?,
                            w((0, 55), (1, 15))?,
                            w((3, 55), (4, 15))?,
                            w((9, 55), (10, 15))?,
                            w((12, 55), (13, 15))?,
                            w((15, 55), (16, 15))?,
                        ],
                    ),
                ],
            ),
            category(
                events_channel,
                vec![
                    EventDefinition::new("Krukan/Nerkan/Turkan/Utukan", &MON_TUE_THU_FRI, vec![w((17, 55), (18, 15))?]),
                    EventDefinition::new("Guerra de Vale", &[2], vec![w((17, 45), (18, 10))?]),
                    EventDefinition::new("Defesa de Cristal", &[3], vec![w((17, 45), (18, 10))?]),
                    EventDefinition::new("Saque do Castelo", &[4], vec![w((17, 45), (18, 10))?]),
                ],
            ),
        ],
    ))
}

fn south_america(server: u32) -> Result<Division, CatalogError> {
    Ok(division(
        format!("SOUTH AMERICA {server}"),
        vec![
            category(
                "wb",
                vec![
                    EventDefinition::new("WB 10:00", &ALL_DAYS, vec![w((9, 55), (10, 15))?]),
                    EventDefinition::new("WB 12:00", &ALL_DAYS, vec![w((11, 55), (12, 15))?]),
                    EventDefinition::new("WB 20:00", &ALL_DAYS, vec![w((13, 55), (20, 15))?]),
                    EventDefinition::new("WB 22:00", &ALL_DAYS, vec![w((21, 55), (22, 15))?]),
                    EventDefinition::new("WB 00:00", &ALL_DAYS, vec![hms((23, 55, 0), (0, 15, 59))?]),
                ],
            ),
            category(
                "eventos",
                vec![
                    EventDefinition::new("Krukan", &[1], vec![w((21, 45), (22, 10))?]),
                    EventDefinition::new("Guerra de Vale", &[2], vec![w((22, 45), (23, 10))?]),
                    EventDefinition::new("Defesa de Cristal", &[3], vec![w((22, 45), (23, 10))?]),
                    EventDefinition::new("Saque do Castelo", &[4], vec![w((22, 45), (23, 10))?]),
                ],
            ),
        ],
    ))
}
