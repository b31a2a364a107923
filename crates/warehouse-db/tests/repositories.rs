use serde_json::{json, Map, Value};
use std::collections::HashSet;

use warehouse_core::models::{
    CommonTags, GeoFilter, ImageField, ImageMeta, ImageSearch, ImageSearchParams, MusicField,
    MusicMeta, NewImage, NewPdf, NewPresentation, NewTrack, Page, PdfField, PresentationField,
    PresentationMeta,
};
use warehouse_core::AppError;
use warehouse_db::{
    in_memory_pool, ImageRepository, MusicRepository, PdfRepository, PresentationRepository,
};

fn image(
    file: &str,
    make: Option<&str>,
    date: Option<&str>,
    coords: Option<(f64, f64)>,
) -> NewImage {
    NewImage {
        file: file.to_string(),
        meta: ImageMeta {
            file_name: file.to_string(),
            file_path: format!("/warehouse/images/{}", file),
            size_bytes: 1024,
            mtime_iso: None,
            make: make.map(str::to_string),
            model: Some("Model X".to_string()),
            create_date: date.map(str::to_string),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            width: Some(640),
            height: Some(480),
            raw: Value::Null,
        },
    }
}

fn track(file: &str, artist: Option<&str>, genre: Option<&str>, year: Option<u32>) -> NewTrack {
    NewTrack {
        file: file.to_string(),
        meta: MusicMeta {
            file: file.to_string(),
            common: CommonTags {
                title: Some(format!("Title of {}", file)),
                artist: artist.map(str::to_string),
                album: Some("Album".to_string()),
                genre: genre.map(|g| vec![g.to_string()]).unwrap_or_default(),
                year,
                ..Default::default()
            },
            format: Default::default(),
            size_bytes: 2048,
            mtime_iso: None,
        },
    }
}

fn pdf(filename: &str, pages: i64, title: &str) -> NewPdf {
    let mut info = Map::new();
    info.insert("Title".to_string(), json!(title));
    info.insert("Author".to_string(), json!("Jane Smith"));
    let mut xmp = Map::new();
    xmp.insert("title".to_string(), json!(format!("{} (xmp)", title)));
    NewPdf {
        filename: filename.to_string(),
        numpages: Some(pages),
        text: format!("Body text of {}", filename),
        xmp,
        info,
    }
}

fn presentation(file_name: &str, title: &str, slides: i64) -> NewPresentation {
    NewPresentation {
        meta: PresentationMeta {
            file_name: file_name.to_string(),
            original: Some(format!("{}.pptx", title)),
            title: Some(title.to_string()),
            organisation: Some("ACME".to_string()),
            slide_count: Some(slides),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_image_upsert_is_idempotent() {
    let pool = in_memory_pool().await.unwrap();
    let repo = ImageRepository::new(pool);

    let first = repo.upsert(&image("a.jpg", Some("SONY"), None, None)).await.unwrap();
    let again = repo.upsert(&image("a.jpg", Some("SONY"), None, None)).await.unwrap();
    assert_eq!(first, again);
    assert_eq!(repo.count().await.unwrap(), 1);

    let record = repo.get(first).await.unwrap().unwrap();
    assert_eq!(record.file, "a.jpg");
    assert_eq!(record.meta.0["make"], "SONY");
    assert!(record.updated_at.is_some());
    assert!(repo.get(first + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn test_image_make_search_is_case_insensitive_contains() {
    let pool = in_memory_pool().await.unwrap();
    let repo = ImageRepository::new(pool);
    repo.upsert(&image("a.jpg", Some("SONY"), None, None)).await.unwrap();
    repo.upsert(&image("b.jpg", Some("Sony Corporation"), None, None)).await.unwrap();
    repo.upsert(&image("c.jpg", Some("Canon"), None, None)).await.unwrap();
    repo.upsert(&image("d.jpg", None, None, None)).await.unwrap();

    let search = ImageSearch {
        make: Some("sony".to_string()),
        ..Default::default()
    };
    let (hits, total) = repo.search(&search, Page::new(20, 0)).await.unwrap();
    assert_eq!(total, 2);
    assert!(hits
        .iter()
        .all(|h| h.make.as_deref().unwrap().to_lowercase().contains("sony")));
}

#[tokio::test]
async fn test_image_text_ranks_exact_file_first() {
    let pool = in_memory_pool().await.unwrap();
    let repo = ImageRepository::new(pool);
    repo.upsert(&image("beach-2.jpg", None, Some("2023-01-01T00:00:00.000Z"), None))
        .await
        .unwrap();
    repo.upsert(&image("beach", None, Some("2020-01-01T00:00:00.000Z"), None))
        .await
        .unwrap();
    repo.upsert(&image("forest.jpg", Some("beachcam"), None, None))
        .await
        .unwrap();

    let search = ImageSearch {
        text: Some("beach".to_string()),
        ..Default::default()
    };
    let (hits, total) = repo.search(&search, Page::new(20, 0)).await.unwrap();
    assert_eq!(total, 3);
    let files: Vec<_> = hits.iter().map(|h| h.file.as_str()).collect();
    assert_eq!(files, vec!["beach", "beach-2.jpg", "forest.jpg"]);
}

#[tokio::test]
async fn test_image_date_range() {
    let pool = in_memory_pool().await.unwrap();
    let repo = ImageRepository::new(pool);
    for (file, date) in [
        ("jan.jpg", "2021-01-15T10:00:00.000Z"),
        ("may.jpg", "2021-05-31T23:59:59.000Z"),
        ("jun.jpg", "2021-06-01T00:00:00.000Z"),
    ] {
        repo.upsert(&image(file, None, Some(date), None)).await.unwrap();
    }
    repo.upsert(&image("undated.jpg", None, None, None)).await.unwrap();

    let search = ImageSearch {
        created_from: Some("2021-05-01T00:00:00.000Z".to_string()),
        created_before: Some("2021-06-01T00:00:00.000Z".to_string()),
        ..Default::default()
    };
    let (hits, total) = repo.search(&search, Page::new(20, 0)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(hits[0].file, "may.jpg");

    let (all, _) = repo.list(Page::new(20, 0)).await.unwrap();
    assert_eq!(all.first().unwrap().file, "jun.jpg");
    assert_eq!(all.last().unwrap().file, "undated.jpg");
}

#[tokio::test]
async fn test_geo_filter_excludes_rows_without_coordinates() {
    let pool = in_memory_pool().await.unwrap();
    let repo = ImageRepository::new(pool);
    repo.upsert(&image("stockholm.jpg", None, None, Some((59.3293, 18.0686))))
        .await
        .unwrap();
    repo.upsert(&image("uppsala.jpg", None, None, Some((59.8586, 17.6389))))
        .await
        .unwrap();
    repo.upsert(&image("gothenburg.jpg", None, None, Some((57.7089, 11.9746))))
        .await
        .unwrap();
    repo.upsert(&image("nowhere.jpg", None, None, None)).await.unwrap();

    let search = ImageSearch {
        near: Some(GeoFilter::new(59.3293, 18.0686, 100.0).unwrap()),
        ..Default::default()
    };
    let (hits, total) = repo.search(&search, Page::new(20, 0)).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(hits[0].file, "stockholm.jpg");
    assert_eq!(hits[1].file, "uppsala.jpg");
    assert!(hits[0].distance_km.unwrap() < 0.01);
    let uppsala = hits[1].distance_km.unwrap();
    assert!((uppsala - 64.0).abs() < 5.0, "got {}", uppsala);

    let wide = ImageSearch {
        near: Some(GeoFilter::new(59.3293, 18.0686, 20_000.0).unwrap()),
        ..Default::default()
    };
    let (hits, total) = repo.search(&wide, Page::new(20, 0)).await.unwrap();
    assert_eq!(total, 3);
    assert!(hits.iter().all(|h| h.latitude.is_some()));
}

#[tokio::test]
async fn test_pages_concatenate_to_full_result() {
    let pool = in_memory_pool().await.unwrap();
    let repo = ImageRepository::new(pool);
    for i in 0..23 {
        // Identical dates force the id tie-break.
        let file = format!("img{:02}.jpg", i);
        repo.upsert(&image(&file, Some("SONY"), Some("2020-01-01T00:00:00.000Z"), None))
            .await
            .unwrap();
    }

    let search = ImageSearch {
        make: Some("SONY".to_string()),
        ..Default::default()
    };
    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let (hits, total) = repo.search(&search, Page::new(5, offset)).await.unwrap();
        assert_eq!(total, 23);
        if hits.is_empty() {
            break;
        }
        seen.extend(hits.into_iter().map(|h| h.id));
        offset += 5;
    }
    assert_eq!(seen.len(), 23);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 23);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_music_search_and_unknown_marker() {
    let pool = in_memory_pool().await.unwrap();
    let repo = MusicRepository::new(pool);
    repo.upsert(&track("01.mp3", Some("ABBA"), Some("Pop"), Some(1976))).await.unwrap();
    repo.upsert(&track("02.mp3", Some("Kent"), Some("Rock"), Some(1996))).await.unwrap();
    repo.upsert(&track("03.mp3", None, Some("Rock"), None)).await.unwrap();

    let (hits, total) = repo.search(MusicField::Genre, "rock", Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 2);
    assert!(hits.iter().all(|h| h.genre.as_deref() == Some("Rock")));

    let (hits, _) = repo.search(MusicField::Year, "1976", Page::new(100, 0)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].artist.as_deref(), Some("ABBA"));
    assert_eq!(hits[0].year, Some(1976));

    let (hits, _) = repo.search(MusicField::Any, "kent", Page::new(100, 0)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file_name, "02.mp3");

    let (hits, total) = repo.search(MusicField::Any, "okänd", Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(hits[0].file_name, "03.mp3");

    let (_, total) = repo.search(MusicField::Artist, "okänd", Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_music_order_is_artist_album_title() {
    let pool = in_memory_pool().await.unwrap();
    let repo = MusicRepository::new(pool);
    repo.upsert(&track("b.mp3", Some("Zappa"), None, None)).await.unwrap();
    repo.upsert(&track("a.mp3", Some("ABBA"), None, None)).await.unwrap();

    let (hits, total) = repo.list(Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(hits[0].artist.as_deref(), Some("ABBA"));
    assert_eq!(repo.delete_all().await.unwrap(), 2);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_pdf_page_ranges_and_lookups() {
    let pool = in_memory_pool().await.unwrap();
    let repo = PdfRepository::new(pool);
    let short = repo.upsert(&pdf("short.pdf", 3, "Short")).await.unwrap();
    repo.upsert(&pdf("medium.pdf", 12, "Medium")).await.unwrap();
    repo.upsert(&pdf("long.pdf", 40, "Long")).await.unwrap();

    let count = |value: &'static str| {
        let repo = repo.clone();
        async move {
            repo.search(PdfField::Pages, value, Page::new(100, 0))
                .await
                .map(|(_, total)| total)
        }
    };
    assert_eq!(count("12").await.unwrap(), 1);
    assert_eq!(count(">10").await.unwrap(), 2);
    assert_eq!(count("<10").await.unwrap(), 1);
    assert_eq!(count("3-12").await.unwrap(), 2);
    assert!(matches!(count("12-3").await, Err(AppError::InvalidRange(_))));

    let (hits, _) = repo.search(PdfField::Title, "medium", Page::new(100, 0)).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].author.as_deref(), Some("Jane Smith"));
    assert_eq!(hits[0].xmp_title.as_deref(), Some("Medium (xmp)"));

    let (hits, _) = repo.list(Page::new(100, 0)).await.unwrap();
    let names: Vec<_> = hits.iter().map(|h| h.filename.as_str()).collect();
    assert_eq!(names, vec!["long.pdf", "medium.pdf", "short.pdf"]);

    let xmp = repo.get_xmp(short).await.unwrap().unwrap();
    assert_eq!(xmp["title"], "Short (xmp)");
    let text = repo.get_text(short).await.unwrap().unwrap();
    assert_eq!(text.text.as_deref(), Some("Body text of short.pdf"));
    let record = repo.get(short).await.unwrap().unwrap();
    assert_eq!(record.info.0["Title"], "Short");
    assert!(repo.get_xmp(9999).await.unwrap().is_none());
    assert!(repo.get_text(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_presentation_sort_and_sample() {
    let pool = in_memory_pool().await.unwrap();
    let repo = PresentationRepository::new(pool);
    repo.upsert(&presentation("c.ppt", "Budget", 30)).await.unwrap();
    repo.upsert(&presentation("a.ppt", "Roadmap", 10)).await.unwrap();
    repo.upsert(&presentation("b.ppt", "Allhands", 20)).await.unwrap();

    let (hits, total) = repo
        .search(
            PresentationField::Organisation,
            "acme",
            PresentationField::SlideCount,
            Page::new(100, 0),
        )
        .await
        .unwrap();
    assert_eq!(total, 3);
    let slides: Vec<_> = hits.iter().map(|h| h.slide_count.unwrap()).collect();
    assert_eq!(slides, vec![10, 20, 30]);

    let (hits, _) = repo
        .search(PresentationField::Any, "road", PresentationField::Title, Page::new(100, 0))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file_name, "a.ppt");

    let (hits, _) = repo
        .search(PresentationField::SlideCount, "20", PresentationField::Title, Page::new(100, 0))
        .await
        .unwrap();
    assert_eq!(hits[0].title.as_deref(), Some("Allhands"));

    let (sample, total) = repo.random_sample(2).await.unwrap();
    assert_eq!(sample.len(), 2);
    assert_eq!(total, 3);
}

fn tagged_track(file: &str, title: &str, artist: &str, album: &str, genre: &str, year: u32) -> NewTrack {
    NewTrack {
        file: file.to_string(),
        meta: MusicMeta {
            file: file.to_string(),
            common: CommonTags {
                title: Some(title.to_string()),
                artist: Some(artist.to_string()),
                album: Some(album.to_string()),
                genre: vec![genre.to_string()],
                year: Some(year),
                ..Default::default()
            },
            format: Default::default(),
            size_bytes: 4096,
            mtime_iso: None,
        },
    }
}

#[tokio::test]
async fn test_every_image_field_finds_its_own_value() {
    let pool = in_memory_pool().await.unwrap();
    let repo = ImageRepository::new(pool);
    repo.upsert(&image("beach.jpg", Some("SONY"), None, None)).await.unwrap();
    repo.upsert(&image("forest.jpg", Some("Canon"), None, None)).await.unwrap();

    for field in ImageField::ALL {
        let value = match field {
            ImageField::File => "beach.jpg",
            ImageField::Make | ImageField::Any => "SONY",
            ImageField::Model => "Model X",
        };
        let search = ImageSearchParams::default()
            .into_search(Some((*field, value.to_string())))
            .unwrap();
        let (hits, _) = repo.search(&search, Page::new(100, 0)).await.unwrap();
        assert!(
            hits.iter().any(|h| h.file == "beach.jpg"),
            "{} = {} did not find beach.jpg",
            field,
            value
        );
    }
}

#[tokio::test]
async fn test_image_file_field_ignores_make_and_model() {
    let pool = in_memory_pool().await.unwrap();
    let repo = ImageRepository::new(pool);
    repo.upsert(&image("beach.jpg", Some("SONY"), None, None)).await.unwrap();

    let by_file = ImageSearchParams::default()
        .into_search(Some((ImageField::File, "sony".to_string())))
        .unwrap();
    let (_, total) = repo.search(&by_file, Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 0);

    let by_any = ImageSearchParams::default()
        .into_search(Some((ImageField::Any, "sony".to_string())))
        .unwrap();
    let (_, total) = repo.search(&by_any, Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_every_music_field_finds_its_own_value() {
    let pool = in_memory_pool().await.unwrap();
    let repo = MusicRepository::new(pool);
    let tracks = [
        tagged_track("disorder.mp3", "Disorder", "Joy Division", "Unknown Pleasures", "Post-punk", 1979),
        tagged_track("airbag.mp3", "Airbag", "Radiohead", "Okay Computer", "Rock", 1997),
        tagged_track("intro.mp3", "Okänd", "Okand Band", "Oka", "Folk", 2001),
    ];
    for track in &tracks {
        repo.upsert(track).await.unwrap();
    }

    for track in &tracks {
        let common = &track.meta.common;
        for field in MusicField::ALL {
            let value = match field {
                MusicField::File => track.file.clone(),
                MusicField::Title => common.title.clone().unwrap(),
                MusicField::Album | MusicField::Any => common.album.clone().unwrap(),
                MusicField::Artist => common.artist.clone().unwrap(),
                MusicField::Genre => common.genre[0].clone(),
                MusicField::Year => common.year.unwrap().to_string(),
            };
            if *field == MusicField::Any && warehouse_core::models::is_unknown_marker(&value) {
                continue;
            }
            let (hits, _) = repo.search(*field, &value, Page::new(100, 0)).await.unwrap();
            assert!(
                hits.iter().any(|h| h.file_name == track.file),
                "{} = {} did not find {}",
                field,
                value,
                track.file
            );
        }
    }

    let (hits, total) = repo
        .search(MusicField::Album, "Unknown Pleasures", Page::new(100, 0))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(hits[0].file_name, "disorder.mp3");
}

#[tokio::test]
async fn test_music_year_comparisons_and_file_field() {
    let pool = in_memory_pool().await.unwrap();
    let repo = MusicRepository::new(pool);
    repo.upsert(&track("01.mp3", Some("ABBA"), None, Some(1976))).await.unwrap();
    repo.upsert(&track("02.mp3", Some("Kent"), None, Some(1996))).await.unwrap();
    repo.upsert(&track("03.mp3", Some("Robyn"), None, Some(2010))).await.unwrap();
    repo.upsert(&track("04.mp3", Some("Zappa"), None, None)).await.unwrap();

    let files = |hits: Vec<warehouse_core::models::MusicTrack>| {
        hits.into_iter().map(|h| h.file_name).collect::<Vec<_>>()
    };

    let (hits, _) = repo.search(MusicField::Year, ">=1996", Page::new(100, 0)).await.unwrap();
    assert_eq!(files(hits), vec!["02.mp3", "03.mp3"]);
    let (hits, _) = repo.search(MusicField::Year, "<1980", Page::new(100, 0)).await.unwrap();
    assert_eq!(files(hits), vec!["01.mp3"]);
    let (hits, _) = repo.search(MusicField::Year, "<>1996", Page::new(100, 0)).await.unwrap();
    assert_eq!(files(hits), vec!["01.mp3", "03.mp3"]);

    let (hits, _) = repo.search(MusicField::File, "03", Page::new(100, 0)).await.unwrap();
    assert_eq!(files(hits), vec!["03.mp3"]);
}

#[tokio::test]
async fn test_every_pdf_field_finds_its_own_value() {
    let pool = in_memory_pool().await.unwrap();
    let repo = PdfRepository::new(pool);
    let mut info = Map::new();
    info.insert("Title".to_string(), json!("Annual Report"));
    info.insert("Author".to_string(), json!("Jane Smith"));
    info.insert("Subject".to_string(), json!("Finance"));
    info.insert("Keywords".to_string(), json!("budget, forecast"));
    let mut xmp = Map::new();
    xmp.insert("title".to_string(), json!("Annual Report 2023"));
    repo.upsert(&NewPdf {
        filename: "annual-report.pdf".to_string(),
        numpages: Some(12),
        text: "Revenue grew in every region".to_string(),
        xmp,
        info,
    })
    .await
    .unwrap();
    repo.upsert(&pdf("other.pdf", 3, "Other")).await.unwrap();

    for field in PdfField::ALL {
        let value = match field {
            PdfField::Filename => "annual-report.pdf",
            PdfField::Title | PdfField::Everything => "Annual Report",
            PdfField::Author => "Jane Smith",
            PdfField::Subject => "Finance",
            PdfField::Keywords => "budget, forecast",
            PdfField::Pages => "12",
            PdfField::Text => "Revenue grew",
        };
        let (hits, _) = repo.search(*field, value, Page::new(100, 0)).await.unwrap();
        assert!(
            hits.iter().any(|h| h.filename == "annual-report.pdf"),
            "{} = {} did not find annual-report.pdf",
            field,
            value
        );
    }

    let (hits, total) = repo.search(PdfField::Everything, "12", Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(hits[0].filename, "annual-report.pdf");
    let (_, total) = repo.search(PdfField::Everything, "xmp", Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 1);
    let (_, total) = repo.search(PdfField::Filename, "report", Page::new(100, 0)).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_every_presentation_field_finds_its_own_value() {
    let pool = in_memory_pool().await.unwrap();
    let repo = PresentationRepository::new(pool);
    let meta = PresentationMeta {
        original: Some("Q3 roadmap.pptx".to_string()),
        mimetype: Some("application/vnd.ms-powerpoint".to_string()),
        title: Some("Roadmap".to_string()),
        organisation: Some("ACME".to_string()),
        file_name: "4f1c9e.ppt".to_string(),
        creation_date: Some("2019-03-01T10:00:00.000Z".to_string()),
        last_modified: Some("2019-04-02T08:30:00.000Z".to_string()),
        revision_number: Some(4),
        slide_count: Some(12),
        word_count: Some(900),
        file_size: Some(20480),
    };
    let id = repo
        .upsert(&NewPresentation { meta: meta.clone() })
        .await
        .unwrap();
    repo.upsert(&presentation("other.ppt", "Budget", 3)).await.unwrap();

    for field in PresentationField::ALL {
        let value = match field {
            PresentationField::CreationDate => meta.creation_date.clone().unwrap(),
            PresentationField::FileName => meta.file_name.clone(),
            PresentationField::FileSize => meta.file_size.unwrap().to_string(),
            PresentationField::Id => id.to_string(),
            PresentationField::LastModified => meta.last_modified.clone().unwrap(),
            PresentationField::Mimetype => meta.mimetype.clone().unwrap(),
            PresentationField::Organisation => meta.organisation.clone().unwrap(),
            PresentationField::Original => meta.original.clone().unwrap(),
            PresentationField::RevisionNumber => meta.revision_number.unwrap().to_string(),
            PresentationField::SlideCount => meta.slide_count.unwrap().to_string(),
            PresentationField::Title | PresentationField::Any => meta.title.clone().unwrap(),
            PresentationField::WordCount => meta.word_count.unwrap().to_string(),
        };
        let (hits, _) = repo
            .search(*field, &value, PresentationField::Title, Page::new(100, 0))
            .await
            .unwrap();
        assert!(
            hits.iter().any(|h| h.id == id),
            "{} = {} did not find the roadmap deck",
            field,
            value
        );
    }
}
